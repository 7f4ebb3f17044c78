use fxhash::FxBuildHasher;
use indexmap::IndexMap;

/// Insertion-ordered so diagnostics and dumps stay deterministic.
type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Table of label -> 11-bit program memory address.
///
/// Owned by the assembler for one run; filled incrementally while scanning
/// and guaranteed complete before the fixup pass reads it.
#[derive(Default, Debug)]
pub struct SymbolTable {
    map: FxMap<String, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            map: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Bind `name` to `addr`. The first definition wins; returns `false`
    /// without rebinding when the label already exists.
    pub fn define(&mut self, name: &str, addr: u16) -> bool {
        if self.map.contains_key(name) {
            return false;
        }
        self.map.insert(name.to_string(), addr);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
