//! # Memory Table
//!
//! Insertion-ordered name -> initial value table, grounded in the teacher's
//! `first_pass/symbol_table.rs` (a linear `Vec<(String, usize)>` rather than
//! a `HashMap`, so emission order matches declaration order — the script
//! compiler relies on this: the `MEM` prelude it emits must walk the table
//! in the order slots were created, not hash order).

#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    entries: Vec<(String, i64)>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Insert a new slot initialised to `value`. No-op if `name` already has
    /// a slot — the first assignment to a name wins its initial value,
    /// matching the "create on demand" rule: later plain re-assignments
    /// mutate the mailbox at runtime via `STA`, they don't redeclare it.
    pub fn declare(&mut self, name: impl Into<String>, value: i64) {
        let name = name.into();
        if !self.contains(&name) {
            self.entries.push((name, value));
        }
    }

    /// Slot names in declaration order, for the `MEM` prelude.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_preserves_insertion_order() {
        let mut t = MemoryTable::new();
        t.declare("b", 2);
        t.declare("a", 1);
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn redeclaring_keeps_the_first_value() {
        let mut t = MemoryTable::new();
        t.declare("x", 5);
        t.declare("x", 99);
        assert_eq!(t.value_of("x"), Some(5));
    }
}
