//! Invalidation-closure computation
//!
//! The reload engine consumes closure computation behind the
//! `ClosureProvider` trait: given the files of a batch, which loaded units
//! are transitively affected? "No affected units" is an ordinary empty set,
//! not an error; a genuine failure aborts only that reload cycle.
//!
//! `DependentMap` is the bundled provider: it indexes `imports` edges from
//! unit manifests at startup and answers closures by walking the reverse
//! edges from the changed units.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::MoltResult;
use crate::loader::FsUnitLoader;
use crate::models::UnitId;
use crate::parser::parse_unit_file;

/// Closure computation as consumed by the reload engine
///
/// `register_changed_files` must be called with the batch's paths before each
/// `compute_closure`, so the provider's view of the graph includes the edits
/// being resolved.
pub trait ClosureProvider: Send {
    /// Update internal graph state for the given changed files
    fn register_changed_files(&mut self, paths: &[PathBuf]) -> MoltResult<()>;

    /// Compute the transitive set of affected units; empty means no effect
    fn compute_closure(&self, batch: &BTreeSet<PathBuf>) -> MoltResult<BTreeSet<UnitId>>;
}

/// Reverse-dependency map over unit manifests
#[derive(Debug)]
pub struct DependentMap {
    loader: FsUnitLoader,
    imports: HashMap<UnitId, BTreeSet<UnitId>>,
}

impl DependentMap {
    /// Build the map by scanning unit files under the project root
    ///
    /// The walk respects ignore files and skips hidden directories, the same
    /// filtering the watch path applies.
    pub fn scan(loader: FsUnitLoader) -> MoltResult<Self> {
        let mut map = Self {
            loader,
            imports: HashMap::new(),
        };

        let walker = WalkBuilder::new(map.loader.root()).build();
        let mut files = Vec::new();
        for entry in walker.into_iter().flatten() {
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
        for path in files {
            map.reindex_file(&path)?;
        }

        Ok(map)
    }

    /// Number of indexed units
    pub fn unit_count(&self) -> usize {
        self.imports.len()
    }

    /// All indexed unit ids
    pub fn unit_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.imports.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Re-read a single file's imports; removes the entry if the file is gone
    fn reindex_file(&mut self, path: &Path) -> MoltResult<()> {
        let Some(id) = self.loader.unit_id_for(path) else {
            return Ok(());
        };

        if !path.is_file() {
            self.imports.remove(&id);
            return Ok(());
        }

        let (manifest, _body) = parse_unit_file(path)?;
        self.imports
            .insert(id, manifest.imports.into_iter().collect());
        Ok(())
    }

    /// Units that directly import each unit (reverse adjacency)
    fn dependents(&self) -> HashMap<&UnitId, Vec<&UnitId>> {
        let mut dependents: HashMap<&UnitId, Vec<&UnitId>> = HashMap::new();
        for (unit, imports) in &self.imports {
            for dep in imports {
                dependents.entry(dep).or_default().push(unit);
            }
        }
        dependents
    }
}

impl ClosureProvider for DependentMap {
    fn register_changed_files(&mut self, paths: &[PathBuf]) -> MoltResult<()> {
        for path in paths {
            self.reindex_file(path)?;
        }
        Ok(())
    }

    fn compute_closure(&self, batch: &BTreeSet<PathBuf>) -> MoltResult<BTreeSet<UnitId>> {
        let seeds: Vec<UnitId> = batch
            .iter()
            .filter_map(|p| self.loader.unit_id_for(p))
            .collect();

        let dependents = self.dependents();
        let mut closure: BTreeSet<UnitId> = BTreeSet::new();
        let mut queue: VecDeque<UnitId> = VecDeque::new();

        for seed in seeds {
            if closure.insert(seed.clone()) {
                queue.push_back(seed);
            }
        }

        while let Some(unit) = queue.pop_front() {
            if let Some(users) = dependents.get(&unit) {
                for user in users {
                    if closure.insert((*user).clone()) {
                        queue.push_back((*user).clone());
                    }
                }
            }
        }

        Ok(closure)
    }
}
