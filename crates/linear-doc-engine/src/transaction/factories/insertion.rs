//! Insertion with structural fix-up.
//!
//! Inserted data is walked item by item while tracking which nodes are open.
//! Wherever an item is not allowed in its parent, the parent is closed (and
//! reopened after the insertion), the item is wrapped in an allowed parent,
//! or bare text is wrapped in a paragraph.

use crate::error::ValidationError;
use crate::model::{Document, Element, Item, NodeType};
use crate::transaction::Transaction;

use super::check_offset;

/// Wrappers to close and nodes to reopen once `expected` is closed.
struct Fixup {
    /// `None` stands for the end of a run of text.
    expected: Option<NodeType>,
    openings: Vec<Element>,
    reopen: Vec<Element>,
}

struct Fixer {
    out: Vec<Item>,
    /// Nodes opened by the inserted data and not yet closed.
    opening_stack: Vec<Element>,
    /// Document nodes closed by the inserted data, innermost last.
    closing_stack: Vec<Element>,
    fixup_stack: Vec<Fixup>,
    /// Document nodes enclosing the current position, outermost first.
    ancestors: Vec<Element>,
    parent_type: NodeType,
    in_text: bool,
    /// Indices in `out` of reopenings written while processing fixups.
    reopen_marks: Vec<usize>,
}

impl Fixer {
    fn new(ancestors: Vec<Element>) -> Self {
        let parent_type = ancestors
            .last()
            .map(|e| e.node_type)
            .unwrap_or(NodeType::Document);
        Self {
            out: Vec::new(),
            opening_stack: Vec::new(),
            closing_stack: Vec::new(),
            fixup_stack: Vec::new(),
            ancestors,
            parent_type,
            in_text: false,
            reopen_marks: Vec::new(),
        }
    }

    fn parent_node_type(&self) -> NodeType {
        self.ancestors
            .last()
            .map(|e| e.node_type)
            .unwrap_or(NodeType::Document)
    }

    fn current_type(&self) -> NodeType {
        self.opening_stack
            .last()
            .map(|e| e.node_type)
            .unwrap_or_else(|| self.parent_node_type())
    }

    /// Close the innermost document node, remembering it for reopening.
    fn close_document_node(&mut self) -> Result<Element, ValidationError> {
        let node = self.ancestors.pop().ok_or(ValidationError::ClosingRoot)?;
        self.closing_stack.push(node.clone());
        Ok(node)
    }

    fn write(&mut self, item: Item) -> Result<(), ValidationError> {
        match item {
            Item::Char { .. } => self.out.push(item),
            Item::Open(element) => {
                let node_type = element.node_type;
                let balances = self.opening_stack.is_empty()
                    && self
                        .closing_stack
                        .last()
                        .is_some_and(|closed| closed.node_type == node_type);
                if balances {
                    if let Some(closed) = self.closing_stack.pop() {
                        self.ancestors.push(closed);
                    }
                } else {
                    self.opening_stack.push(element.clone());
                }
                self.parent_type = node_type;
                self.out.push(Item::Open(element));
            }
            Item::Close(node_type) => {
                let expected = self.current_type();
                if expected == NodeType::Document {
                    return Err(ValidationError::ClosingRoot);
                }
                if node_type != expected
                    && !(node_type.can_contain_content() && expected.can_contain_content())
                {
                    return Err(ValidationError::MismatchedClose {
                        expected: expected.to_string(),
                        found: node_type,
                    });
                }
                if self.opening_stack.pop().is_none() {
                    self.close_document_node()?;
                }
                self.out.push(Item::Close(expected));
            }
        }
        Ok(())
    }

    /// Process the top fixup if it waits for `expected`.
    fn pop_fixup(&mut self, expected: Option<NodeType>) -> Result<(), ValidationError> {
        match self.fixup_stack.pop() {
            Some(fixup) if fixup.expected == expected => self.process_fixup(fixup),
            Some(fixup) => {
                self.fixup_stack.push(fixup);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn process_fixup(&mut self, fixup: Fixup) -> Result<(), ValidationError> {
        for opening in fixup.openings.iter().rev() {
            self.write(Item::Close(opening.node_type))?;
        }
        for element in fixup.reopen.into_iter().rev() {
            self.write(Item::Open(element))?;
            self.reopen_marks.push(self.out.len() - 1);
        }
        Ok(())
    }

    fn leave_text(&mut self) -> Result<(), ValidationError> {
        if !self.in_text {
            return Ok(());
        }
        self.in_text = false;
        self.pop_fixup(None)?;
        self.parent_type = self.current_type();
        Ok(())
    }

    /// Drop a reopening written just before, instead of closing it again.
    fn cancel_reopen(&mut self, node_type: NodeType) -> bool {
        let top = self.out.len().checked_sub(1);
        let reopened = top.is_some() && self.reopen_marks.last().copied() == top;
        if reopened
            && matches!(self.out.last(), Some(Item::Open(e)) if e.node_type == node_type)
        {
            self.out.pop();
            self.reopen_marks.pop();
            return true;
        }
        false
    }

    fn open(&mut self, item: Item) -> Result<(), ValidationError> {
        let mut child = item.node_type();
        let mut openings: Vec<Element> = Vec::new();
        let mut closings: Vec<NodeType> = Vec::new();
        let mut reopen: Vec<Element> = Vec::new();

        if child.is_none_or(NodeType::is_content) && !self.parent_type.can_contain_content() {
            child = Some(NodeType::Paragraph);
            openings.insert(0, NodeType::Paragraph.default_element());
        }

        // Wrap in allowed parents until the current parent fits.
        while let Some(child_type) = child {
            if child_type.allows_parent(self.parent_type) {
                break;
            }
            let Some(&wrapper) = child_type.parent_types().and_then(|parents| parents.first())
            else {
                return Err(ValidationError::NoLegalParent(child_type));
            };
            if wrapper == NodeType::Document {
                // Only legal at the root; the closing loop below gets there.
                break;
            }
            child = Some(wrapper);
            openings.insert(0, wrapper.default_element());
        }

        // Close parents until the child is allowed.
        loop {
            let parent = self.parent_type;
            let allowed = match child {
                None => parent.child_types().is_none(),
                Some(child_type) => {
                    parent.allows_child(child_type)
                        && child_type.allows_parent(parent)
                        && !(!child_type.is_content() && parent.can_contain_content())
                }
            };
            if allowed {
                break;
            }
            if !(closings.is_empty() && self.cancel_reopen(parent)) {
                closings.push(parent);
            }
            match self.opening_stack.pop() {
                Some(popped) => {
                    reopen.push(popped);
                    self.parent_type = self.current_type();
                }
                None => {
                    let node = self.close_document_node()?;
                    reopen.push(node);
                    self.parent_type = self.parent_node_type();
                }
            }
        }

        for node_type in closings {
            self.out.push(Item::Close(node_type));
        }
        for opening in &openings {
            self.write(Item::Open(opening.clone()))?;
        }
        let item_type = item.node_type();
        self.write(item)?;

        match item_type {
            None => {
                self.in_text = true;
                if !openings.is_empty() {
                    self.parent_type = child.unwrap_or(NodeType::Paragraph);
                    self.fixup_stack.push(Fixup {
                        expected: None,
                        openings,
                        reopen,
                    });
                }
            }
            Some(node_type) => {
                self.fixup_stack.push(Fixup {
                    expected: Some(node_type),
                    openings,
                    reopen,
                });
                self.parent_type = node_type;
            }
        }
        Ok(())
    }

    fn close(&mut self, node_type: NodeType) -> Result<(), ValidationError> {
        self.write(Item::Close(node_type))?;
        self.pop_fixup(Some(node_type))?;
        self.parent_type = self.current_type();
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Item>, ValidationError> {
        self.leave_text()?;
        while let Some(open) = self.opening_stack.last() {
            let node_type = open.node_type;
            self.write(Item::Close(node_type))?;
        }
        while let Some(closed) = self.closing_stack.last() {
            let element = closed.clone();
            self.write(Item::Open(element))?;
        }
        Ok(self.out)
    }
}

/// Rewrite `data` so that inserting it at `offset` leaves `doc` balanced and
/// every node in a legal parent.
pub fn fixup_insertion(
    doc: &Document,
    offset: usize,
    data: Vec<Item>,
) -> Result<Vec<Item>, ValidationError> {
    check_offset(doc, offset)?;
    let input_len = data.len();
    let mut fixer = Fixer::new(doc.ancestors_at(offset));
    for item in data {
        if item.is_element() {
            fixer.leave_text()?;
        }
        match item {
            Item::Close(node_type) => fixer.close(node_type)?,
            item => fixer.open(item)?,
        }
    }
    let fixed = fixer.finish()?;
    if fixed.len() != input_len {
        log::debug!(
            "Insertion at {offset} rebalanced: {input_len} items became {}",
            fixed.len()
        );
    }
    Ok(fixed)
}

impl Transaction {
    /// Insert `data` at `offset`, closing and reopening enclosing nodes and
    /// wrapping content as needed to keep the document well-formed.
    pub fn new_from_insertion(
        doc: &Document,
        offset: usize,
        data: Vec<Item>,
    ) -> Result<Transaction, ValidationError> {
        let fixed = fixup_insertion(doc, offset, data)?;
        let mut tx = Transaction::new();
        tx.push_retain(offset);
        tx.push_replace(doc, offset, 0, fixed)?;
        tx.push_retain(doc.len() - offset);
        Ok(tx)
    }
}
