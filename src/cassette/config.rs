//! Loading cassettes from disk.

use std::path::Path;

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Load a cassette file and create a replayer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    Cassette::load(path).map(|cassette| CassetteReplayer::new(&cassette))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Outcome;

    #[test]
    fn load_valid_cassette() {
        let dir = std::env::temp_dir().join("imagegrid_cassette_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.cassette.yaml");
        std::fs::write(
            &path,
            "name: test\nrecorded_at: \"2026-02-01T00:00:00Z\"\ncommit: abc\ninteractions:\n  \
             - seq: 0\n    port: gateway\n    method: random_prompt\n    output:\n      Ok: a cat\n",
        )
        .unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let i = replayer.next_interaction("gateway", "random_prompt").unwrap();
        assert_eq!(i.seq, 0);
        assert_eq!(i.output, Outcome::Ok(serde_json::json!("a cat")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_fails() {
        assert!(load_cassette(Path::new("/nonexistent/cassette.yaml")).is_err());
    }

    #[test]
    fn load_garbage_fails() {
        let path = std::env::temp_dir().join("imagegrid_cassette_garbage.yaml");
        std::fs::write(&path, "interactions: [[[").unwrap();
        match load_cassette(&path) {
            Err(e) => assert!(e.contains("Failed to parse")),
            Ok(_) => panic!("garbage cassette should not load"),
        }
        let _ = std::fs::remove_file(&path);
    }
}
