//! Data-directory layout and input loading.
//!
//! A working directory holds one character and any number of motions:
//!
//! ```text
//! {dir}/character.json          skeleton definition
//! {dir}/motions/*.txt           motion JSON, one clip per file
//! {dir}/v/{name}_goal.txt       goal velocity side file (optional)
//! {dir}/v/{name}_comvel.txt     center-of-mass velocity side file (optional)
//! {dir}/y/{name}.txt            precomputed heading side file (optional)
//! {dir}/bvh/{name}.bvh          conversion output
//! ```
//!
//! Side files are optional per motion; a present but malformed one is fatal
//! for that motion, like any other malformed input.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use bvhforge_core::{MotionClip, SideChannels, Skeleton};

/// A motion working directory and its path conventions.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn character_path(&self) -> PathBuf {
        self.root.join("character.json")
    }

    pub fn motions_dir(&self) -> PathBuf {
        self.root.join("motions")
    }

    pub fn bvh_dir(&self) -> PathBuf {
        self.root.join("bvh")
    }

    pub fn heading_dir(&self) -> PathBuf {
        self.root.join("y")
    }

    pub fn goal_velocity_path(&self, name: &str) -> PathBuf {
        self.root.join("v").join(format!("{name}_goal.txt"))
    }

    pub fn com_velocity_path(&self, name: &str) -> PathBuf {
        self.root.join("v").join(format!("{name}_comvel.txt"))
    }

    pub fn heading_path(&self, name: &str) -> PathBuf {
        self.heading_dir().join(format!("{name}.txt"))
    }

    pub fn bvh_output_path(&self, name: &str) -> PathBuf {
        self.bvh_dir().join(format!("{name}.bvh"))
    }

    /// Enumerates motion files matching `filter`, sorted by file name so
    /// runs are deterministic. Each entry is the motion name (file stem)
    /// and its path.
    pub fn motion_files(&self, filter: &NameFilter) -> Result<Vec<(String, PathBuf)>> {
        let dir = self.motions_dir();
        let mut found = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("failed to read motions directory: {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_path_buf();
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            if filter.matches(&name) {
                found.push((name, path));
            }
        }
        Ok(found)
    }
}

/// Which motions of the directory a run covers.
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// Every file in the motions directory.
    All,
    /// A single motion by exact name.
    Exact(String),
    /// Motions whose name matches a regular expression.
    Pattern(regex::Regex),
}

impl NameFilter {
    /// Builds the filter from the `--file` / `--regex` arguments; the two
    /// are mutually exclusive.
    pub fn from_args(file: Option<&str>, pattern: Option<&str>) -> Result<Self> {
        match (file, pattern) {
            (Some(_), Some(_)) => bail!("--file and --regex are mutually exclusive"),
            (Some(name), None) => Ok(Self::Exact(name.to_string())),
            (None, Some(pattern)) => {
                let regex = regex::Regex::new(pattern)
                    .with_context(|| format!("invalid motion name pattern: {pattern}"))?;
                Ok(Self::Pattern(regex))
            }
            (None, None) => Ok(Self::All),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(exact) => name == exact,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// Loads and parses the character skeleton of a directory.
pub fn load_skeleton(dir: &DataDir) -> Result<Skeleton> {
    let path = dir.character_path();
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read character file: {}", path.display()))?;
    Skeleton::from_json(&text)
        .with_context(|| format!("failed to parse character file: {}", path.display()))
}

/// Loads and parses one motion clip.
pub fn load_clip(path: &Path) -> Result<MotionClip> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read motion file: {}", path.display()))?;
    MotionClip::from_json(&text)
        .with_context(|| format!("failed to parse motion file: {}", path.display()))
}

/// Resolves the optional side files of a motion. Absent files leave their
/// channel empty; present but malformed files are errors.
pub fn load_sides(dir: &DataDir, name: &str) -> Result<SideChannels> {
    let mut sides = SideChannels::default();

    let heading = dir.heading_path(name);
    if heading.is_file() {
        let text = fs::read_to_string(&heading)
            .with_context(|| format!("failed to read heading file: {}", heading.display()))?;
        sides.heading = Some(
            bvhforge_core::sidecar::parse_heading_file(&text, "heading file")
                .with_context(|| format!("failed to parse heading file: {}", heading.display()))?,
        );
    }

    let goal = dir.goal_velocity_path(name);
    if goal.is_file() {
        let text = fs::read_to_string(&goal)
            .with_context(|| format!("failed to read velocity file: {}", goal.display()))?;
        sides.expected_velocity = Some(
            bvhforge_core::sidecar::parse_vector_file(&text, "goal velocity file")
                .with_context(|| format!("failed to parse velocity file: {}", goal.display()))?,
        );
    }

    let com = dir.com_velocity_path(name);
    if com.is_file() {
        let text = fs::read_to_string(&com)
            .with_context(|| format!("failed to read velocity file: {}", com.display()))?;
        sides.actual_velocity = Some(
            bvhforge_core::sidecar::parse_vector_file(&text, "com velocity file")
                .with_context(|| format!("failed to parse velocity file: {}", com.display()))?,
        );
    }

    Ok(sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_motions(root: &Path, names: &[&str]) {
        fs::create_dir_all(root.join("motions")).unwrap();
        for name in names {
            fs::write(root.join("motions").join(format!("{name}.txt")), "{}").unwrap();
        }
    }

    #[test]
    fn test_motion_files_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        seed_motions(tmp.path(), &["walk", "idle", "run"]);

        let dir = DataDir::new(tmp.path());
        let files = dir.motion_files(&NameFilter::All).unwrap();
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["idle", "run", "walk"]);
    }

    #[test]
    fn test_exact_filter_selects_one() {
        let tmp = tempfile::tempdir().unwrap();
        seed_motions(tmp.path(), &["walk", "walk_fast"]);

        let dir = DataDir::new(tmp.path());
        let filter = NameFilter::from_args(Some("walk"), None).unwrap();
        let files = dir.motion_files(&filter).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "walk");
    }

    #[test]
    fn test_regex_filter() {
        let tmp = tempfile::tempdir().unwrap();
        seed_motions(tmp.path(), &["walk", "walk_fast", "run"]);

        let dir = DataDir::new(tmp.path());
        let filter = NameFilter::from_args(None, Some("^walk")).unwrap();
        let files = dir.motion_files(&filter).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_file_and_regex_are_exclusive() {
        assert!(NameFilter::from_args(Some("walk"), Some("w.*")).is_err());
    }

    #[test]
    fn test_load_sides_with_missing_files_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path());
        let sides = load_sides(&dir, "walk").unwrap();
        assert!(sides.heading.is_none());
        assert!(sides.expected_velocity.is_none());
        assert!(sides.actual_velocity.is_none());
    }

    #[test]
    fn test_load_sides_reads_present_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("v")).unwrap();
        fs::create_dir_all(tmp.path().join("y")).unwrap();
        fs::write(tmp.path().join("v/walk_goal.txt"), "1 0 0\n").unwrap();
        fs::write(tmp.path().join("y/walk.txt"), "0\n15\n").unwrap();

        let dir = DataDir::new(tmp.path());
        let sides = load_sides(&dir, "walk").unwrap();
        assert_eq!(sides.expected_velocity.unwrap(), vec![[1.0, 0.0, 0.0]]);
        assert_eq!(sides.heading.unwrap(), vec![0.0, 15.0]);
        assert!(sides.actual_velocity.is_none());
    }

    #[test]
    fn test_load_sides_malformed_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("v")).unwrap();
        fs::write(tmp.path().join("v/walk_goal.txt"), "1 2\n").unwrap();

        let dir = DataDir::new(tmp.path());
        assert!(load_sides(&dir, "walk").is_err());
    }
}
