//! CE alignment through an external PyMOL process
//!
//! Both molecules are written as PDB into a scratch directory, PyMOL runs a
//! generated script (`pymol -cq align.py`) that calls `cmd.cealign` and saves
//! the moved object, and the result is read back. The script reports RMSD and
//! alignment length on a tagged stdout line.

use std::path::{Path, PathBuf};
use std::process::Command;

use cemsa_io::pdb::{read_pdb, write_pdb};
use cemsa_mol::Molecule;

use super::{AlignOutcome, StructureAligner};
use crate::config::CeParams;
use crate::error::AlignerError;

const RESULT_TAG: &str = "CEMSA_RESULT";
const ERROR_TAG: &str = "CEMSA_ERROR";

const REFERENCE_PDB: &str = "ref.pdb";
const MOBILE_PDB: &str = "mobile.pdb";
const ALIGNED_PDB: &str = "aligned.pdb";
const SCRIPT: &str = "align.py";

/// Aligner backed by PyMOL's `cealign`
#[derive(Debug, Clone)]
pub struct PymolCeAligner {
    executable: PathBuf,
    params: CeParams,
}

impl PymolCeAligner {
    pub fn new(executable: impl AsRef<Path>, params: CeParams) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            params,
        }
    }
}

/// Double-quoted Python string literal
fn py_str(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

fn render_script(reference: &Path, mobile: &Path, output: &Path, params: &CeParams) -> String {
    format!(
        r#"from pymol import cmd

cmd.load({reference}, "ref")
cmd.load({mobile}, "mobile")
try:
    result = cmd.cealign("ref", "mobile", d0={d0}, d1={d1}, window={window}, gap_max={gap_max})
except Exception as exc:
    print("{error_tag} %s" % exc)
    raise SystemExit(2)

rmsd = None
length = None
if isinstance(result, dict):
    rmsd = result.get("RMSD", result.get("RMS"))
    length = result.get("alignment_length")
else:
    try:
        rmsd = float(result)
    except Exception:
        rmsd = None
print("{result_tag} rmsd=%s length=%s" % (rmsd, length))
cmd.save({output}, "mobile")
"#,
        reference = py_str(reference),
        mobile = py_str(mobile),
        output = py_str(output),
        d0 = params.d0,
        d1 = params.d1,
        window = params.window,
        gap_max = params.gap_max,
        error_tag = ERROR_TAG,
        result_tag = RESULT_TAG,
    )
}

/// RMSD and alignment length from the tagged result line.
///
/// Non-numeric values (`None`, `N/A`) come back as `None`.
fn parse_result(stdout: &str) -> Option<(Option<f32>, Option<usize>)> {
    let line = stdout.lines().rev().find_map(|l| l.trim().strip_prefix(RESULT_TAG))?;
    let mut rmsd = None;
    let mut length = None;
    for field in line.split_whitespace() {
        match field.split_once('=') {
            Some(("rmsd", value)) => rmsd = value.parse::<f32>().ok().filter(|v| v.is_finite()),
            Some(("length", value)) => length = value.parse::<usize>().ok(),
            _ => {}
        }
    }
    Some((rmsd, length))
}

fn parse_error(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix(ERROR_TAG))
        .map(|msg| msg.trim().to_string())
}

impl StructureAligner for PymolCeAligner {
    fn name(&self) -> &str {
        "cealign"
    }

    fn align(&self, reference: &Molecule, mobile: &Molecule) -> Result<AlignOutcome, AlignerError> {
        let scratch = tempfile::tempdir()?;
        let dir = scratch.path();
        let ref_path = dir.join(REFERENCE_PDB);
        let mobile_path = dir.join(MOBILE_PDB);
        let out_path = dir.join(ALIGNED_PDB);
        let script_path = dir.join(SCRIPT);

        write_pdb(&ref_path, reference)?;
        write_pdb(&mobile_path, mobile)?;
        std::fs::write(&script_path, render_script(&ref_path, &mobile_path, &out_path, &self.params))?;

        let program = self.executable.display().to_string();
        log::debug!("Running {} -cq {}", program, script_path.display());
        let output = Command::new(&self.executable)
            .arg("-cq")
            .arg(&script_path)
            .current_dir(dir)
            .output()
            .map_err(|source| AlignerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let message = parse_error(&stdout)
                .unwrap_or_else(|| String::from_utf8_lossy(&output.stderr).trim().to_string());
            return Err(AlignerError::ExternalFailed {
                program,
                status: output.status.to_string(),
                message,
            });
        }
        if let Some(message) = parse_error(&stdout) {
            return Err(AlignerError::Unalignable(message));
        }
        if !out_path.exists() {
            return Err(AlignerError::MissingOutput(out_path));
        }

        let (rmsd, aligned_length) = parse_result(&stdout).unwrap_or((None, None));
        let mut aligned = read_pdb(&out_path)?;
        aligned.name = mobile.name.clone();
        aligned.title = mobile.title.clone();
        aligned.source = mobile.source.clone();

        Ok(AlignOutcome {
            aligned,
            rmsd,
            aligned_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_line() {
        let stdout = " PyMOL banner\nCEMSA_RESULT rmsd=1.2345 length=112\n";
        assert_eq!(parse_result(stdout), Some((Some(1.2345), Some(112))));
    }

    #[test]
    fn test_parse_result_without_rmsd() {
        assert_eq!(parse_result("CEMSA_RESULT rmsd=None length=None"), Some((None, None)));
        assert_eq!(parse_result("CEMSA_RESULT rmsd=nan length=40"), Some((None, Some(40))));
        assert_eq!(parse_result("no tagged output"), None);
    }

    #[test]
    fn test_parse_error_line() {
        let stdout = "CEMSA_ERROR Error: selection ref has no atoms\n";
        assert_eq!(parse_error(stdout).as_deref(), Some("Error: selection ref has no atoms"));
        assert_eq!(parse_error("CEMSA_RESULT rmsd=1.0 length=3"), None);
    }

    #[test]
    fn test_script_calls_cealign_with_params() {
        let params = CeParams {
            window: 10,
            ..CeParams::default()
        };
        let script = render_script(
            Path::new("/tmp/x/ref.pdb"),
            Path::new("/tmp/x/mobile.pdb"),
            Path::new("/tmp/x/aligned.pdb"),
            &params,
        );
        assert!(script.contains(r#"cmd.load("/tmp/x/ref.pdb", "ref")"#));
        assert!(script.contains(r#"cmd.cealign("ref", "mobile", d0=3, d1=4, window=10, gap_max=30)"#));
        assert!(script.contains(r#"result.get("RMSD", result.get("RMS"))"#));
        assert!(script.contains(r#"cmd.save("/tmp/x/aligned.pdb", "mobile")"#));
    }

    #[test]
    fn test_py_str_escapes() {
        assert_eq!(py_str(Path::new(r#"a"b\c"#)), r#""a\"b\\c""#);
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let aligner = PymolCeAligner::new("/nonexistent/bin/pymol", CeParams::default());
        let mut mol = Molecule::new("m");
        mol.add_atom(
            cemsa_mol::Atom::new("CA", cemsa_mol::Element::Carbon).with_residue("ALA", 1, "A"),
            lin_alg::f32::Vec3::new(0.0, 0.0, 0.0),
        );
        let err = aligner.align(&mol, &mol).unwrap_err();
        assert!(matches!(err, AlignerError::Spawn { .. }));
    }
}
