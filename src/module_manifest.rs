//! Module manifest.
//!
//! Whole-program record of which file defines which module and which modules
//! each file references. Files are visited one at a time while emitting; the
//! manifest is queried at the end to order files so that dependencies come
//! first.
//!
//! References are stored exactly as added, duplicates included. A reference
//! to a module that no file defines is an external dependency and takes no
//! part in ordering.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct FileEntry {
    /// Modules the file defines, in registration order.
    modules: Vec<String>,
    references: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleManifest {
    /// Module name -> defining file.
    module_to_file: IndexMap<String, String>,
    /// File name -> modules it defines and modules it references.
    files: IndexMap<String, FileEntry>,
}

/// A reference cycle between files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependencyError {
    /// Files on the cycle, in reference order. The first file references the
    /// second, and the last references the first.
    pub cycle: Vec<String>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular module reference: {}", self.cycle.join(" -> "))?;
        if let Some(first) = self.cycle.first() {
            write!(f, " -> {first}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CircularDependencyError {}

/// One file of the manifest in its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub file_name: String,
    pub modules: Vec<String>,
    pub references: Vec<String>,
}

impl ModuleManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `file_name` defines `module`. Registering a module again
    /// moves it to the new file. A file may define several modules.
    pub fn add_module(&mut self, file_name: &str, module: &str) {
        let previous = self
            .module_to_file
            .insert(module.to_string(), file_name.to_string());
        if let Some(previous) = previous.filter(|previous| previous != file_name) {
            debug!(module, from = %previous, to = file_name, "module moved to another file");
            if let Some(entry) = self.files.get_mut(&previous) {
                entry.modules.retain(|m| m != module);
            }
        }
        let entry = self.files.entry(file_name.to_string()).or_default();
        if !entry.modules.iter().any(|m| m == module) {
            entry.modules.push(module.to_string());
        }
    }

    /// Record that `file_name` references `module`. Duplicates are kept.
    pub fn add_referenced_module(&mut self, file_name: &str, module: &str) {
        self.files
            .entry(file_name.to_string())
            .or_default()
            .references
            .push(module.to_string());
    }

    /// Merge `other` into this manifest. Module registrations in `other` win;
    /// reference lists are appended.
    pub fn add_manifest(&mut self, other: &ModuleManifest) {
        for (file_name, entry) in &other.files {
            for module in &entry.modules {
                self.add_module(file_name, module);
            }
            for module in &entry.references {
                self.add_referenced_module(file_name, module);
            }
        }
    }

    /// Every defined module, in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.module_to_file.keys().map(String::as_str)
    }

    pub fn get_file_name_from_module(&self, module: &str) -> Option<&str> {
        self.module_to_file.get(module).map(String::as_str)
    }

    /// The first module registered for `file_name`.
    pub fn get_module_from_file_name(&self, file_name: &str) -> Option<&str> {
        self.get_modules_from_file_name(file_name)
            .first()
            .map(String::as_str)
    }

    pub fn get_modules_from_file_name(&self, file_name: &str) -> &[String] {
        self.files
            .get(file_name)
            .map(|entry| entry.modules.as_slice())
            .unwrap_or_default()
    }

    /// Every file seen, whether it defined a module or only referenced one.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn get_referenced_modules(&self, file_name: &str) -> &[String] {
        self.files
            .get(file_name)
            .map(|entry| entry.references.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files ordered so that every file comes after the files defining the
    /// modules it references. Files keep their visiting order where the
    /// references leave them free.
    pub fn dependency_order(&self) -> Result<Vec<&str>, CircularDependencyError> {
        let mut order = Vec::with_capacity(self.files.len());
        let mut visited = vec![false; self.files.len()];
        let mut on_path = vec![false; self.files.len()];
        let mut path = Vec::new();

        for index in 0..self.files.len() {
            self.visit(index, &mut visited, &mut on_path, &mut path, &mut order)?;
        }

        Ok(order
            .into_iter()
            .filter_map(|index| self.files.get_index(index).map(|(name, _)| name.as_str()))
            .collect())
    }

    /// Post-order DFS. `path` holds the files currently being visited so a
    /// back edge can report the cycle it closes.
    fn visit(
        &self,
        index: usize,
        visited: &mut [bool],
        on_path: &mut [bool],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), CircularDependencyError> {
        if visited[index] {
            return Ok(());
        }
        if on_path[index] {
            let start = path.iter().position(|&i| i == index).unwrap_or(0);
            let cycle = path[start..]
                .iter()
                .filter_map(|&i| self.files.get_index(i).map(|(name, _)| name.clone()))
                .collect();
            return Err(CircularDependencyError { cycle });
        }

        on_path[index] = true;
        path.push(index);

        if let Some((file_name, entry)) = self.files.get_index(index) {
            for module in &entry.references {
                let Some(target) = self.get_file_name_from_module(module) else {
                    continue;
                };
                if target == file_name {
                    continue;
                }
                if let Some(target_index) = self.files.get_index_of(target) {
                    self.visit(target_index, visited, on_path, path, order)?;
                }
            }
        }

        path.pop();
        on_path[index] = false;
        visited[index] = true;
        order.push(index);
        Ok(())
    }

    /// JSON form, in dependency order when the references allow it and in
    /// visiting order otherwise.
    pub fn entries(&self) -> Vec<ManifestEntry> {
        let names: Vec<&str> = match self.dependency_order() {
            Ok(order) => order,
            Err(err) => {
                debug!(%err, "manifest has a cycle; keeping visiting order");
                self.file_names().collect()
            }
        };
        names
            .into_iter()
            .filter_map(|name| {
                self.files.get(name).map(|entry| ManifestEntry {
                    file_name: name.to_string(),
                    modules: entry.modules.clone(),
                    references: entry.references.clone(),
                })
            })
            .collect()
    }
}
