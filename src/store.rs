//! Best-score persistence under ~/.hopbird/.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const FILE_NAME: &str = "best_score.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScore {
    best_score: u32,
}

fn save_path() -> io::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    Ok(home.join(".hopbird").join(FILE_NAME))
}

/// Load the persisted best score, or 0 when there is none (first launch,
/// unreadable file, unparseable contents).
pub fn load_best() -> u32 {
    let path = match save_path() {
        Ok(p) => p,
        Err(_) => return 0,
    };
    match fs::read_to_string(&path) {
        Ok(json) => serde_json::from_str::<BestScore>(&json)
            .map(|b| b.best_score)
            .unwrap_or_default(),
        Err(_) => 0,
    }
}

/// Persist a new best score.
pub fn save_best(best: u32) -> io::Result<()> {
    let path = save_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&BestScore { best_score: best })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)?;
    Ok(())
}

/// Fold a finished run's score into the running best. Returns whether the
/// best improved and should be re-persisted.
pub fn record(best: &mut u32, score: u32) -> bool {
    if score > *best {
        *best = score;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_path_format() {
        let path = save_path().expect("save_path should succeed");
        assert!(path.to_string_lossy().ends_with(".hopbird/best_score.json"));
    }

    #[test]
    fn test_best_score_serialization() {
        let json = serde_json::to_string_pretty(&BestScore { best_score: 7 }).unwrap();
        let loaded: BestScore = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.best_score, 7);
    }

    #[test]
    fn test_invalid_json_defaults_to_zero() {
        let parsed = serde_json::from_str::<BestScore>("not json")
            .map(|b| b.best_score)
            .unwrap_or_default();
        assert_eq!(parsed, 0);
    }

    #[test]
    fn test_record_only_improves() {
        let mut best = 5;
        assert!(record(&mut best, 7));
        assert_eq!(best, 7);

        assert!(!record(&mut best, 3));
        assert_eq!(best, 7);

        assert!(!record(&mut best, 7));
        assert_eq!(best, 7);
    }
}
