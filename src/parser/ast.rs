use std::fmt::Debug;
use std::rc::Rc;

use serde::Serialize;

/// Line/column pair. `line` is 1-based, `column` is a 0-based character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
    pub loc: SourceLocation,
}

impl Meta {
    /// Covers the source from the start of `first` to the end of `last`.
    pub fn spanning(first: &Meta, last: &Meta) -> Meta {
        Meta {
            start_index: first.start_index,
            end_index: last.end_index,
            loc: SourceLocation {
                start: first.loc.start,
                end: last.loc.end,
            },
        }
    }

    pub fn source_text<'a>(&self, script: &'a str) -> &'a str {
        script.get(self.start_index..self.end_index).unwrap_or("")
    }
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierData {
    pub name: String,
    pub meta: Meta,
}

#[derive(Debug)]
pub struct ProgramData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

#[derive(Debug)]
pub enum ExpressionType {
    Literal(LiteralData),
    Identifier(IdentifierData),
    ThisExpression {
        meta: Meta,
    },
    ArrayExpression {
        meta: Meta,
        elements: Vec<ExpressionType>,
    },
    ObjectExpression {
        meta: Meta,
        properties: Vec<PropertyData>,
    },
    FunctionExpression(Rc<FunctionData>),
    UnaryExpression {
        meta: Meta,
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    UpdateExpression {
        meta: Meta,
        operator: UpdateOperator,
        argument: Box<ExpressionType>,
        prefix: bool,
    },
    BinaryExpression {
        meta: Meta,
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    AssignmentExpression {
        meta: Meta,
        operator: AssignmentOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        meta: Meta,
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        meta: Meta,
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    CallExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
    NewExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
    MemberExpression(MemberExpressionType),
    SequenceExpression {
        //A comma-separated sequence of expressions
        meta: Meta,
        expressions: Vec<ExpressionType>,
    },
}

impl ExpressionType {
    /// ESTree `type` tag of the node.
    pub fn type_name(&self) -> &'static str {
        match self {
            ExpressionType::Literal(_) => "Literal",
            ExpressionType::Identifier(_) => "Identifier",
            ExpressionType::ThisExpression { .. } => "ThisExpression",
            ExpressionType::ArrayExpression { .. } => "ArrayExpression",
            ExpressionType::ObjectExpression { .. } => "ObjectExpression",
            ExpressionType::FunctionExpression(f) => {
                if f.is_arrow {
                    "ArrowFunctionExpression"
                } else {
                    "FunctionExpression"
                }
            }
            ExpressionType::UnaryExpression { .. } => "UnaryExpression",
            ExpressionType::UpdateExpression { .. } => "UpdateExpression",
            ExpressionType::BinaryExpression { .. } => "BinaryExpression",
            ExpressionType::AssignmentExpression { .. } => "AssignmentExpression",
            ExpressionType::LogicalExpression { .. } => "LogicalExpression",
            ExpressionType::ConditionalExpression { .. } => "ConditionalExpression",
            ExpressionType::CallExpression { .. } => "CallExpression",
            ExpressionType::NewExpression { .. } => "NewExpression",
            ExpressionType::MemberExpression(_) => "MemberExpression",
            ExpressionType::SequenceExpression { .. } => "SequenceExpression",
        }
    }
}

impl HasMeta for ExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            ExpressionType::Literal(data) => &data.meta,
            ExpressionType::Identifier(data) => &data.meta,
            ExpressionType::ThisExpression { meta } => meta,
            ExpressionType::ArrayExpression { meta, .. } => meta,
            ExpressionType::ObjectExpression { meta, .. } => meta,
            ExpressionType::FunctionExpression(data) => &data.meta,
            ExpressionType::UnaryExpression { meta, .. } => meta,
            ExpressionType::UpdateExpression { meta, .. } => meta,
            ExpressionType::BinaryExpression { meta, .. } => meta,
            ExpressionType::AssignmentExpression { meta, .. } => meta,
            ExpressionType::LogicalExpression { meta, .. } => meta,
            ExpressionType::ConditionalExpression { meta, .. } => meta,
            ExpressionType::CallExpression { meta, .. } => meta,
            ExpressionType::NewExpression { meta, .. } => meta,
            ExpressionType::MemberExpression(data) => data.get_meta(),
            ExpressionType::SequenceExpression { meta, .. } => meta,
        }
    }
}

#[derive(Debug)]
pub enum MemberExpressionType {
    SimpleMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: IdentifierData,
    },
    ComputedMemberExpression {
        meta: Meta,
        object: Box<ExpressionType>,
        property: Box<ExpressionType>,
    },
}

impl MemberExpressionType {
    pub fn object(&self) -> &ExpressionType {
        match self {
            MemberExpressionType::SimpleMemberExpression { object, .. } => object,
            MemberExpressionType::ComputedMemberExpression { object, .. } => object,
        }
    }
}

impl HasMeta for MemberExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            MemberExpressionType::SimpleMemberExpression { meta, .. } => meta,
            MemberExpressionType::ComputedMemberExpression { meta, .. } => meta,
        }
    }
}

#[derive(Debug)]
pub struct PropertyData {
    pub meta: Meta,
    pub key: String,
    pub value: ExpressionType,
}

#[derive(Debug)]
pub struct LiteralData {
    pub meta: Meta,
    pub value: LiteralType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    NumberLiteral(NumberLiteralType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteralType {
    IntegerLiteral(i64),
    FloatLiteral(f64),
}

impl NumberLiteralType {
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberLiteralType::IntegerLiteral(i) => *i as f64,
            NumberLiteralType::FloatLiteral(f) => *f,
        }
    }
}

#[derive(Debug)]
pub struct FunctionData {
    pub meta: Meta,
    pub id: Option<IdentifierData>,
    pub params: Vec<IdentifierData>,
    pub body: FunctionBodyOrExpression,
    pub is_arrow: bool,
}

impl FunctionData {
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }

    /// Span of the `{ ... }` block, or of the expression for concise arrows.
    pub fn body_meta(&self) -> &Meta {
        match &self.body {
            FunctionBodyOrExpression::FunctionBody(body) => &body.meta,
            FunctionBodyOrExpression::Expression(expr) => expr.get_meta(),
        }
    }
}

#[derive(Debug)]
pub enum FunctionBodyOrExpression {
    FunctionBody(FunctionBodyData),
    Expression(Box<ExpressionType>),
}

#[derive(Debug)]
pub struct FunctionBodyData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

#[derive(Debug)]
pub enum StatementType {
    ExpressionStatement {
        meta: Meta,
        expression: ExpressionType,
    },
    BlockStatement(BlockStatementData),
    EmptyStatement {
        meta: Meta,
    },
    ReturnStatement {
        meta: Meta,
        argument: Option<ExpressionType>,
    },
    BreakStatement {
        meta: Meta,
    },
    ContinueStatement {
        meta: Meta,
    },
    IfStatement {
        meta: Meta,
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    WhileStatement {
        meta: Meta,
        test: ExpressionType,
        body: Box<StatementType>,
    },
    DoWhileStatement {
        meta: Meta,
        body: Box<StatementType>,
        test: ExpressionType,
    },
    ForStatement {
        meta: Meta,
        init: Option<VariableDeclarationOrExpression>,
        test: Option<ExpressionType>,
        update: Option<ExpressionType>,
        body: Box<StatementType>,
    },
    ThrowStatement {
        meta: Meta,
        argument: ExpressionType,
    },
    TryStatement {
        meta: Meta,
        block: BlockStatementData,
        handler: Option<CatchClauseData>,
        finalizer: Option<BlockStatementData>,
    },
    DeclarationStatement(DeclarationType),
}

impl StatementType {
    pub fn type_name(&self) -> &'static str {
        match self {
            StatementType::ExpressionStatement { .. } => "ExpressionStatement",
            StatementType::BlockStatement(_) => "BlockStatement",
            StatementType::EmptyStatement { .. } => "EmptyStatement",
            StatementType::ReturnStatement { .. } => "ReturnStatement",
            StatementType::BreakStatement { .. } => "BreakStatement",
            StatementType::ContinueStatement { .. } => "ContinueStatement",
            StatementType::IfStatement { .. } => "IfStatement",
            StatementType::WhileStatement { .. } => "WhileStatement",
            StatementType::DoWhileStatement { .. } => "DoWhileStatement",
            StatementType::ForStatement { .. } => "ForStatement",
            StatementType::ThrowStatement { .. } => "ThrowStatement",
            StatementType::TryStatement { .. } => "TryStatement",
            StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(_)) => {
                "FunctionDeclaration"
            }
            StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(_)) => {
                "VariableDeclaration"
            }
        }
    }
}

impl HasMeta for StatementType {
    fn get_meta(&self) -> &Meta {
        match self {
            StatementType::ExpressionStatement { meta, .. } => meta,
            StatementType::BlockStatement(data) => &data.meta,
            StatementType::EmptyStatement { meta } => meta,
            StatementType::ReturnStatement { meta, .. } => meta,
            StatementType::BreakStatement { meta } => meta,
            StatementType::ContinueStatement { meta } => meta,
            StatementType::IfStatement { meta, .. } => meta,
            StatementType::WhileStatement { meta, .. } => meta,
            StatementType::DoWhileStatement { meta, .. } => meta,
            StatementType::ForStatement { meta, .. } => meta,
            StatementType::ThrowStatement { meta, .. } => meta,
            StatementType::TryStatement { meta, .. } => meta,
            StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(f)) => {
                &f.meta
            }
            StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(v)) => {
                &v.meta
            }
        }
    }
}

#[derive(Debug)]
pub struct BlockStatementData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

#[derive(Debug)]
pub struct CatchClauseData {
    pub meta: Meta,
    pub param: Option<IdentifierData>,
    pub body: BlockStatementData,
}

#[derive(Debug)]
pub enum VariableDeclarationOrExpression {
    VariableDeclaration(VariableDeclarationData),
    Expression(ExpressionType),
}

#[derive(Debug)]
pub enum DeclarationType {
    FunctionDeclaration(Rc<FunctionData>),
    VariableDeclaration(VariableDeclarationData),
}

#[derive(Debug)]
pub struct VariableDeclarationData {
    pub meta: Meta,
    pub declarations: Vec<VariableDeclaratorData>,
    pub kind: VariableDeclarationKind,
}

#[derive(Debug)]
pub struct VariableDeclaratorData {
    pub meta: Meta,
    pub id: IdentifierData,
    pub init: Option<ExpressionType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    PlusPlus,
    MinusMinus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    EqualEqual,
    NotEqual,
    StrictlyEqual,
    StrictlyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    In,
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
    MultiplyEquals,
    DivideEquals,
    ModuloEquals,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies before storing.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Equals => None,
            AssignmentOperator::AddEquals => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractEquals => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyEquals => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideEquals => Some(BinaryOperator::Divide),
            AssignmentOperator::ModuloEquals => Some(BinaryOperator::Modulo),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    Or,
    And,
}
