use crate::{Error, Object, Result};

/// Operand stack fed by the tokenizer and drained by CMap keywords.
///
/// Entries keep the byte offset at which the operand started.
#[derive(Debug, Default)]
pub struct OperandStack {
    items: Vec<(usize, Object)>,
}

impl OperandStack {
    pub fn new() -> OperandStack {
        OperandStack::default()
    }

    pub fn push(&mut self, offset: usize, obj: Object) {
        self.items.push((offset, obj));
    }

    /// Removes the `n` most recently pushed operands, oldest first.
    ///
    /// Leaves the stack untouched when fewer than `n` operands are held.
    pub fn pop(&mut self, n: usize) -> Result<Vec<(usize, Object)>> {
        if n > self.items.len() {
            return Err(Error::StackUnderflow {
                requested: n,
                available: self.items.len(),
            });
        }
        let at = self.items.len() - n;
        Ok(self.items.split_off(at))
    }

    /// Removes every operand, oldest first.
    pub fn popall(&mut self) -> Vec<(usize, Object)> {
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
