use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
    ptr,
};

use log::{debug, info, trace};
use path_clean::clean;

use crate::{
    error::FrontEndError,
    host::{FsHost, SourceHost},
    parser::parse_declaration_file,
    resolver::resolve,
    symbols::{AliasTarget, ModuleSymbols, Symbol, SymbolKind},
    tree::SyntaxTree,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which module specifiers the front end follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Follow relative specifiers; package specifiers are never resolved
    #[default]
    LocalOnly,
    /// Parse the entry file alone
    EntryOnly,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrontEndConfig {
    pub resolution: ResolutionMode,
}

/// Produces a [`Program`] for an entry file.
pub trait FrontEnd {
    fn load(&self, entry: &Path, config: &FrontEndConfig) -> Result<Program, FrontEndError>;
}

#[derive(Debug)]
pub struct SourceFile {
    id: FileId,
    path: PathBuf,
    tree: SyntaxTree,
    module: Option<ModuleSymbols>,
    links: HashMap<String, Option<FileId>>,
}

impl SourceFile {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Symbol table, `None` when the file is a script rather than a module.
    pub fn module(&self) -> Option<&ModuleSymbols> {
        self.module.as_ref()
    }
}

/// Every file parsed for one entry, with their symbol tables.
#[derive(Debug, Default)]
pub struct Program {
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, FileId>,
}

impl Program {
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn find(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(&clean(path)).copied()
    }

    /// File a module specifier of `from` points to, if it was loaded.
    pub fn link(&self, from: FileId, request: &str) -> Option<FileId> {
        self.file(from).links.get(request).copied().flatten()
    }

    /// Raw exports of a module, including names pulled in by `export *`.
    ///
    /// Returns `None` when the file is not a module.
    pub fn exports(&self, file: FileId) -> Option<Vec<&Symbol>> {
        let module = self.file(file).module()?;
        let mut exports: Vec<&Symbol> = module.exports().iter().collect();
        let mut seen: HashSet<&str> = module.exports().iter().map(|s| s.name.as_str()).collect();
        let mut visited = HashSet::from([file]);
        self.collect_star_exports(file, &mut exports, &mut seen, &mut visited);
        Some(exports)
    }

    fn collect_star_exports<'p>(
        &'p self,
        file: FileId,
        exports: &mut Vec<&'p Symbol>,
        seen: &mut HashSet<&'p str>,
        visited: &mut HashSet<FileId>,
    ) {
        let Some(module) = self.file(file).module() else {
            return;
        };
        for request in module.star_requests() {
            let Some(target) = self.link(file, request) else {
                debug!("Skipping `export * from '{}'`, the module is not loaded", request);
                continue;
            };
            if !visited.insert(target) {
                continue;
            }
            if let Some(target_module) = self.file(target).module() {
                for symbol in target_module.exports() {
                    if symbol.name != "default" && seen.insert(symbol.name.as_str()) {
                        exports.push(symbol);
                    }
                }
            }
            self.collect_star_exports(target, exports, seen, visited);
        }
    }

    /// Looks up an export of `file` by name, searching `export *` modules too.
    pub fn export_named(&self, file: FileId, name: &str) -> Option<&Symbol> {
        self.export_named_in(file, name, &mut HashSet::new())
    }

    fn export_named_in(&self, file: FileId, name: &str, visited: &mut HashSet<FileId>) -> Option<&Symbol> {
        if !visited.insert(file) {
            return None;
        }
        let module = self.file(file).module()?;
        if let Some(symbol) = module.export(name) {
            return Some(symbol);
        }
        if name == "default" {
            return None;
        }
        module
            .star_requests()
            .iter()
            .filter_map(|request| self.link(file, request))
            .find_map(|target| self.export_named_in(target, name, visited))
    }

    /// Follows an alias chain to the symbol it finally denotes.
    ///
    /// Returns `None` when the chain leaves the loaded files, names something
    /// that does not exist, targets a whole module, or loops.
    pub fn resolve_alias<'p>(&'p self, symbol: &'p Symbol) -> Option<&'p Symbol> {
        let mut visited: Vec<&Symbol> = Vec::new();
        let mut current = symbol;
        loop {
            let SymbolKind::Alias(target) = &current.kind else {
                return Some(current);
            };
            if visited.iter().any(|seen| ptr::eq(*seen, current)) {
                debug!("Alias cycle through '{}'", current.name);
                return None;
            }
            visited.push(current);
            trace!("Following alias '{}' -> {:?}", current.name, target);
            current = match target {
                AliasTarget::Local(name) => self.file(current.file).module()?.local(name)?,
                AliasTarget::Export { request, name } => {
                    let module = self.link(current.file, request)?;
                    self.export_named(module, name)?
                }
                AliasTarget::Namespace { .. } => return None,
            };
        }
    }
}

/// Front end backed by `oxc_parser`.
pub struct OxcFrontEnd<H> {
    host: H,
}

impl<H: SourceHost> OxcFrontEnd<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl Default for OxcFrontEnd<FsHost> {
    fn default() -> Self {
        Self::new(FsHost)
    }
}

impl<H: SourceHost> FrontEnd for OxcFrontEnd<H> {
    fn load(&self, entry: &Path, config: &FrontEndConfig) -> Result<Program, FrontEndError> {
        info!("Loading {}", entry.display());
        let mut program = Program::default();
        let mut pending: Vec<HashMap<String, Option<PathBuf>>> = Vec::new();
        let mut queue = VecDeque::from([clean(entry)]);

        while let Some(path) = queue.pop_front() {
            if program.by_path.contains_key(&path) {
                continue;
            }
            if !self.host.exists(&path) {
                debug!("Skipping missing file: {}", path.display());
                continue;
            }
            let source = self
                .host
                .read(&path)
                .map_err(|source| FrontEndError::Io { path: path.clone(), source })?;

            let id = FileId(program.files.len() as u32);
            let parsed = parse_declaration_file(id, &path, &source)?;

            let mut links = HashMap::new();
            for request in parsed.requests {
                let resolved = match config.resolution {
                    ResolutionMode::LocalOnly => resolve(&self.host, &path, &request),
                    ResolutionMode::EntryOnly => None,
                };
                if let Some(target) = &resolved {
                    queue.push_back(target.clone());
                }
                links.insert(request, resolved);
            }
            pending.push(links);

            program.by_path.insert(path.clone(), id);
            program.files.push(SourceFile {
                id,
                path,
                tree: parsed.tree,
                module: parsed.module,
                links: HashMap::new(),
            });
        }

        for (file, links) in program.files.iter_mut().zip(pending) {
            file.links = links
                .into_iter()
                .map(|(request, target)| {
                    let id = target.and_then(|path| program.by_path.get(&path).copied());
                    (request, id)
                })
                .collect();
        }

        debug!("Loaded {} files for {}", program.files.len(), entry.display());
        Ok(program)
    }
}
