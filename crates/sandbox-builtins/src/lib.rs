//! Builtin modules implemented in-process.
//!
//! Each module contributes a `build_*_builtins()` set of declarations with
//! their host implementations; [`register_all`] merges them into a table
//! builder. These are the "local computation" modules of the scripting
//! surface: encoding, hashing, math and regular expressions. Modules backed
//! by remote services live in `sandbox-connectors`.

pub mod base64;
pub mod hash;
pub mod json;
pub mod math;
pub mod re;
pub mod yaml;

use anyhow::Result;
use sandbox_core::TableBuilder;

/// Register every local builtin module.
pub fn register_all(builder: &mut TableBuilder) -> Result<()> {
    builder.register("json", json::build_json_builtins()?)?;
    builder.register("yaml", yaml::build_yaml_builtins()?)?;
    builder.register("base64", base64::build_base64_builtins()?)?;
    builder.register("hash", hash::build_hash_builtins()?)?;
    builder.register("math", math::build_math_builtins()?)?;
    builder.register("re", re::build_re_builtins()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::TableBuilder;

    #[test]
    fn test_all_modules_register_cleanly() {
        let mut builder = TableBuilder::new();
        register_all(&mut builder).unwrap();
        let table = builder.build();
        assert_eq!(
            table.modules(),
            vec!["json", "yaml", "base64", "hash", "math", "re"]
        );
        assert!(table.lookup("math", "atan2").is_some());
        assert!(table.lookup("re", "sub").is_some());
    }
}
