use crate::ast::Statement;

/// A statement together with the text it was compiled from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatement {
    pub text: String,
    pub statement: Statement,
}

/// The compiled, immutable statement sequence for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<SourceStatement>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceStatement> {
        self.statements.iter()
    }
}
