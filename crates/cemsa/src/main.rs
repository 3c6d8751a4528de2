use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cemsa::stages::{ce_align, correspond, merge};
use cemsa::{aligner, logging, AlignerBackend, PipelineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "cemsa",
    about = "Align a folder of protein structures onto a reference and build a structure-guided MSA.",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// JSON configuration file. Flags given on the command line take precedence.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Log file (defaults to a per-command name in the working directory).
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,
    /// Log to stderr only.
    #[arg(long, global = true, conflicts_with = "log_file")]
    no_log_file: bool,
    /// Alignment session file written by `align` and read by `extract`.
    #[arg(long, value_name = "FILE", global = true)]
    session: Option<PathBuf>,
    /// Folder for the pairwise FASTA files.
    #[arg(long, value_name = "DIR", global = true)]
    fasta_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Superpose every structure in the PDB folder onto the reference.
    Align(AlignArgs),
    /// Extract residue correspondences from the alignment session.
    Extract(ExtractArgs),
    /// Merge pairwise FASTA files into one MSA.
    Merge(MergeArgs),
    /// Run align, extract and merge in sequence.
    Run(RunArgs),
}

#[derive(Debug, Default, Args)]
struct AlignArgs {
    /// Folder holding the reference and the target structures.
    #[arg(long, value_name = "DIR")]
    pdb_dir: Option<PathBuf>,
    /// File name of the reference structure inside the PDB folder.
    #[arg(long, value_name = "FILE")]
    reference: Option<String>,
    /// Structure aligner.
    #[arg(long, value_enum)]
    backend: Option<AlignerBackend>,
    /// PyMOL executable used by the pymol backend.
    #[arg(long, value_name = "PATH")]
    pymol: Option<PathBuf>,
    /// Also write each aligned target as <name>_aligned.pdb.
    #[arg(long)]
    export_aligned: bool,
    /// Folder for exported aligned structures.
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
}

impl AlignArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        let align = &mut config.align;
        if let Some(dir) = &self.pdb_dir {
            align.pdb_dir = dir.clone();
        }
        if let Some(reference) = &self.reference {
            align.reference_file = reference.clone();
        }
        if let Some(backend) = self.backend {
            align.backend = backend;
        }
        if let Some(pymol) = &self.pymol {
            align.pymol_executable = pymol.clone();
        }
        if self.export_aligned {
            align.export_aligned = true;
        }
        if let Some(dir) = &self.export_dir {
            align.export_dir = dir.clone();
        }
    }
}

#[derive(Debug, Default, Args)]
struct ExtractArgs {
    /// CA proximity threshold in Å.
    #[arg(long, value_name = "ANGSTROM")]
    threshold: Option<f32>,
    /// Also extract targets whose structural alignment failed.
    #[arg(long)]
    include_unaligned: bool,
}

impl ExtractArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(threshold) = self.threshold {
            config.extract.threshold = threshold;
        }
        if self.include_unaligned {
            config.extract.include_unaligned = true;
        }
    }
}

#[derive(Debug, Default, Args)]
struct MergeArgs {
    /// MSA output file.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Wrap sequences at this width (0 keeps one line per sequence).
    #[arg(long, value_name = "N")]
    line_width: Option<usize>,
}

impl MergeArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(output) = &self.output {
            config.merge.output = output.clone();
        }
        if let Some(width) = self.line_width {
            config.merge.line_width = width;
        }
    }
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    #[command(flatten)]
    align: AlignArgs,
    #[command(flatten)]
    extract: ExtractArgs,
    #[command(flatten)]
    merge: MergeArgs,
}

impl Command {
    fn default_log_file(&self) -> &'static str {
        match self {
            Command::Align(_) => "alignment.log",
            Command::Extract(_) => "seq_alignment.log",
            Command::Merge(_) => "msa_generator.log",
            Command::Run(_) => "pipeline.log",
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(session) = &cli.session {
        config.session = session.clone();
    }
    if let Some(dir) = &cli.fasta_dir {
        config.fasta_dir = dir.clone();
    }
    match &cli.command {
        Command::Align(args) => args.apply(&mut config),
        Command::Extract(args) => args.apply(&mut config),
        Command::Merge(args) => args.apply(&mut config),
        Command::Run(args) => {
            args.align.apply(&mut config);
            args.extract.apply(&mut config);
            args.merge.apply(&mut config);
        }
    }
    config.validate()?;
    Ok(config)
}

fn run_align(config: &PipelineConfig) -> Result<()> {
    let backend = aligner::from_config(&config.align);
    let summary = ce_align::align_folder(config, backend.as_ref()).context("Structural alignment failed")?;
    log::info!(
        "Aligned {} of {} targets, session saved to {}",
        summary.aligned_count(),
        summary.targets.len(),
        summary.session.display()
    );
    Ok(())
}

fn run_extract(config: &PipelineConfig) -> Result<()> {
    let summary = correspond::extract_folder(config).context("Sequence extraction failed")?;
    log::info!(
        "Wrote {} pairwise alignments ({} skipped, {} failed)",
        summary.written.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    if !summary.skipped.is_empty() {
        log::info!("Targets with failed alignments are skipped by default; pass --include-unaligned to extract them");
    }
    Ok(())
}

fn run_merge(config: &PipelineConfig) -> Result<()> {
    let summary = merge::merge_folder(config).context("MSA generation failed")?;
    log::info!(
        "MSA of {} targets written to {}",
        summary.targets,
        summary.output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = if cli.no_log_file {
        None
    } else {
        Some(
            cli.log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(cli.command.default_log_file())),
        )
    };
    logging::init(log_file.as_deref(), "info")?;

    let config = load_config(&cli)?;
    match &cli.command {
        Command::Align(_) => run_align(&config)?,
        Command::Extract(_) => run_extract(&config)?,
        Command::Merge(_) => run_merge(&config)?,
        Command::Run(_) => {
            run_align(&config)?;
            run_extract(&config)?;
            run_merge(&config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "cemsa",
            "--session",
            "run.prs",
            "run",
            "--pdb-dir",
            "structures",
            "--backend",
            "pymol",
            "--threshold",
            "2.5",
            "--line-width",
            "60",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.session, PathBuf::from("run.prs"));
        assert_eq!(config.align.pdb_dir, PathBuf::from("structures"));
        assert_eq!(config.align.backend, AlignerBackend::Pymol);
        assert_eq!(config.extract.threshold, 2.5);
        assert_eq!(config.merge.line_width, 60);
        assert_eq!(cli.command.default_log_file(), "pipeline.log");
    }

    #[test]
    fn test_align_defaults_to_ce() {
        let cli = Cli::parse_from(["cemsa", "align"]);
        assert_eq!(load_config(&cli).unwrap().align.backend, AlignerBackend::Ce);
        assert_eq!(cli.command.default_log_file(), "alignment.log");
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let cli = Cli::parse_from(["cemsa", "extract", "--threshold", "0"]);
        assert!(load_config(&cli).is_err());
    }
}
