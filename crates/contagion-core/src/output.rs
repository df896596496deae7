//! JSON artifacts written at the end of a run.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use contagion_events::{GraphSnapshot, TickStatistics};

pub const SNAPSHOT_FILE: &str = "final_graph.json";
pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the final graph snapshot, creating `dir` if needed.
pub fn write_snapshot(dir: &Path, snapshot: &GraphSnapshot) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SNAPSHOT_FILE);
    fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(path)
}

/// Writes the latest statistics, history included.
pub fn write_statistics(dir: &Path, stats: &TickStatistics) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(STATS_FILE);
    fs::write(&path, serde_json::to_string_pretty(stats)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParams;
    use crate::simulation::Simulation;
    use tempfile::tempdir;

    #[test]
    fn test_writes_both_artifacts() {
        let mut sim = Simulation::new(SimulationParams::default(), 11, 0);
        sim.tick(1000).unwrap();
        sim.tick(2000).unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("run");

        let snapshot_path = write_snapshot(&out, &sim.snapshot()).unwrap();
        let stats_path = write_statistics(&out, &sim.statistics()).unwrap();

        let snapshot: GraphSnapshot =
            serde_json::from_str(&fs::read_to_string(snapshot_path).unwrap()).unwrap();
        assert_eq!(snapshot.node_ids(), sim.snapshot().node_ids());
        assert_eq!(snapshot.edge_count(), sim.state().store.edge_count());

        let stats: TickStatistics =
            serde_json::from_str(&fs::read_to_string(stats_path).unwrap()).unwrap();
        assert_eq!(stats.day, 2);
        assert_eq!(stats.history.len(), 2);
    }
}
