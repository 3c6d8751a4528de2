//! Serde helpers for `lin_alg` types, which carry no serde impls of their own.

pub mod vec3_vec_serde {
    use lin_alg::f32::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(coords: &[Vec3], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let flat: Vec<[f32; 3]> = coords.iter().map(|v| [v.x, v.y, v.z]).collect();
        flat.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec3>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let flat: Vec<[f32; 3]> = Deserialize::deserialize(deserializer)?;
        Ok(flat.into_iter().map(|[x, y, z]| Vec3::new(x, y, z)).collect())
    }
}
