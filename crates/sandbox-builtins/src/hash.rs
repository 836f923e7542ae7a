//! `hash` module: hex digests of strings.

use anyhow::Result;
use sandbox_core::{Builtin, HostError, Signature};
use sandbox_types::TypeDescriptor as T;
use serde_json::Value as JsonValue;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

fn digest_builtin(name: &str, digest: fn(&str) -> String) -> Result<Builtin> {
    let signature = Signature::builder()
        .param("s", T::string())
        .returns(T::string())
        .build()?;
    Ok(Builtin::new(name, signature, move |args, _| {
        let s = args.str("s").map_err(HostError::failed)?;
        Ok(JsonValue::String(digest(s)))
    }))
}

pub fn build_hash_builtins() -> Result<Vec<Builtin>> {
    Ok(vec![
        digest_builtin("sha1", |s| hex::encode(Sha1::digest(s.as_bytes())))?,
        digest_builtin("sha256", |s| hex::encode(Sha256::digest(s.as_bytes())))?,
        digest_builtin("sha512", |s| hex::encode(Sha512::digest(s.as_bytes())))?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::{bind, CallContext};
    use sandbox_types::SandboxValue;

    fn digest_of(name: &str, input: &str) -> String {
        let builtins = build_hash_builtins().unwrap();
        let builtin = builtins.iter().find(|b| b.name == name).unwrap();
        let bound = bind(
            &builtin.signature,
            &[SandboxValue::from(input)],
            &indexmap::IndexMap::new(),
        )
        .unwrap();
        let out = (builtin.host)(bound, &CallContext::unbounded()).unwrap();
        out.as_str().unwrap().to_string()
    }

    #[test]
    fn test_sha1_known_vector() {
        assert_eq!(
            digest_of("sha1", "hello world!"),
            "430ce34d020724ed75a196dfc2ad67c77772d169"
        );
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            digest_of("sha256", "hello world!"),
            "7509e5bda0c762d2bac7f90d758b5b2263fa01ccbc542ab5e3df163be08e6ca9"
        );
    }

    #[test]
    fn test_sha512_length() {
        assert_eq!(digest_of("sha512", "x").len(), 128);
    }
}
