use crate::error::{Result, SymstackError};
use crate::functions::StackKind;

/// Paired float/bool stacks used by one evaluation or rendering pass
///
/// The two stacks are independent: pushing onto one never changes the
/// other's depth, so an instruction's arity is always checked against the
/// stack it actually pops from. `F` and `B` are whole columns in vectorized
/// mode, scalars in per-step mode, and rendered fragments in the symbolic
/// renderer.
#[derive(Debug)]
pub struct DualStacks<F, B> {
    floats: Vec<F>,
    bools: Vec<B>,
}

impl<F, B> DualStacks<F, B> {
    pub fn new() -> Self {
        Self {
            floats: Vec::new(),
            bools: Vec::new(),
        }
    }

    /// Current depth of the selected stack
    pub fn depth(&self, kind: StackKind) -> usize {
        match kind {
            StackKind::Float => self.floats.len(),
            StackKind::Bool => self.bools.len(),
        }
    }

    pub fn push_float(&mut self, value: F) {
        self.floats.push(value);
    }

    pub fn push_bool(&mut self, value: B) {
        self.bools.push(value);
    }

    /// Pop the float stack; underflow means a caller skipped the arity gate
    pub fn pop_float(&mut self) -> Result<F> {
        self.floats
            .pop()
            .ok_or_else(|| SymstackError::Evaluation("float stack underflow".to_string()))
    }

    /// Pop the bool stack; underflow means a caller skipped the arity gate
    pub fn pop_bool(&mut self) -> Result<B> {
        self.bools
            .pop()
            .ok_or_else(|| SymstackError::Evaluation("bool stack underflow".to_string()))
    }

    /// Most recent float entry without removing it
    pub fn last_float(&self) -> Option<&F> {
        self.floats.last()
    }

    /// Consume the stacks, keeping every float entry in push order
    pub fn into_floats(self) -> Vec<F> {
        self.floats
    }
}

impl<F, B> Default for DualStacks<F, B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stacks: DualStacks<f64, bool> = DualStacks::new();
        stacks.push_float(1.0);
        stacks.push_float(2.0);
        assert_eq!(stacks.pop_float().unwrap(), 2.0);
        assert_eq!(stacks.pop_float().unwrap(), 1.0);
        assert!(stacks.pop_float().is_err());
    }

    #[test]
    fn test_stacks_are_independent() {
        let mut stacks: DualStacks<f64, bool> = DualStacks::new();
        stacks.push_float(1.0);
        stacks.push_bool(true);
        stacks.push_bool(false);
        assert_eq!(stacks.depth(StackKind::Float), 1);
        assert_eq!(stacks.depth(StackKind::Bool), 2);
        stacks.pop_bool().unwrap();
        assert_eq!(stacks.depth(StackKind::Float), 1);
    }

    #[test]
    fn test_last_float_keeps_entry() {
        let mut stacks: DualStacks<f64, bool> = DualStacks::new();
        stacks.push_float(3.5);
        assert_eq!(stacks.last_float(), Some(&3.5));
        assert_eq!(stacks.depth(StackKind::Float), 1);
        assert_eq!(stacks.into_floats(), vec![3.5]);
    }
}
