//! Abstract Syntax Tree types
//!
//! Node structs serialize as ESTree-shaped JSON: each struct carries its own `"type"`
//! tag and the category enums ([`Statement`], [`Expression`], [`FunctionParam`]) are
//! untagged, so a node always appears as a single flat object.

use serde::Serialize;

pub use crate::scanner::Position;

/// Line/column span of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Optional position information, filled in when the options ask for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// One end of a node as reported to a delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetadataPosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Span information passed to a delegate for every finished node, whatever the options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeMetadata {
    pub start: MetadataPosition,
    pub end: MetadataPosition,
}

/// Access to the position slot every node carries
pub trait Located {
    fn location(&self) -> &NodeLocation;
    fn location_mut(&mut self) -> &mut NodeLocation;
}

// ============ PROGRAM ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub struct Script {
    pub body: Vec<Statement>,
    pub source_type: SourceType,
    #[serde(flatten)]
    pub location: NodeLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<TokenEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<crate::error::ParseError>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
}

/// A token as returned in `Script::tokens` and by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenEntry {
    #[serde(rename = "type")]
    pub token_type: &'static str,
    /// Raw source text of the token
    pub value: String,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    Line,
}

/// A comment as returned in `Script::comments` and by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    #[serde(flatten)]
    pub location: NodeLocation,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Statement {
    // Declarations
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(FunctionDeclaration),

    // Control Flow
    Block(BlockStatement),
    If(IfStatement),
    For(ForStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),

    // Jump
    Return(ReturnStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Throw(ThrowStatement),

    // Other
    Expression(ExpressionStatement),
    Labeled(LabeledStatement),
    Empty(EmptyStatement),
    Debugger(DebuggerStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ExpressionStatement {
    pub expression: Expression,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub kind: VariableKind,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub init: Option<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionDeclaration {
    pub id: Option<Identifier>,
    pub params: Vec<FunctionParam>,
    pub body: BlockStatement,
    pub generator: bool,
    pub expression: bool,
    #[serde(rename = "async")]
    pub async_: bool,
    #[serde(flatten)]
    pub location: NodeLocation,
}

/// A formal parameter: a plain name or a name with a default value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FunctionParam {
    Identifier(Identifier),
    AssignmentPattern(AssignmentPattern),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentPattern {
    pub left: Identifier,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    VariableDeclaration(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    /// Filled in once the loop header has been parsed
    pub body: Box<Statement>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Box<Statement>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct DoWhileStatement {
    pub body: Box<Statement>,
    pub test: Expression,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BreakStatement {
    pub label: Option<Identifier>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ContinueStatement {
    pub label: Option<Identifier>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ThrowStatement {
    pub argument: Expression,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LabeledStatement {
    pub label: Identifier,
    pub body: Box<Statement>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct EmptyStatement {
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct DebuggerStatement {
    #[serde(flatten)]
    pub location: NodeLocation,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    Assignment(AssignmentExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    Sequence(SequenceExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Function(FunctionExpression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    pub name: String,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Literal {
    pub value: LiteralValue,
    pub raw: String,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    #[serde(serialize_with = "serialize_number")]
    Number(f64),
    String(String),
    Null,
}

/// Integral values are written without a fraction (`1`, not `1.0`).
fn serialize_number<S: serde::Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*n as i64)
    } else {
        serializer.serialize_f64(*n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: Box<Expression>,
    pub prefix: bool,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UpdateExpression {
    pub operator: UpdateOp,
    pub argument: Box<Expression>,
    pub prefix: bool,
    #[serde(flatten)]
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionExpression {
    pub id: Option<Identifier>,
    pub params: Vec<FunctionParam>,
    pub body: BlockStatement,
    pub generator: bool,
    pub expression: bool,
    #[serde(rename = "async")]
    pub async_: bool,
    #[serde(flatten)]
    pub location: NodeLocation,
}

// ============ OPERATORS ============

/// Defines an operator enum whose variants serialize as their source text.
macro_rules! operators {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn from_punctuator(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operators!(
    /// Operators of a [`BinaryExpression`]
    BinaryOp {
        BitOr => "|",
        BitXor => "^",
        BitAnd => "&",
        Eq => "==",
        NotEq => "!=",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        GtEq => ">=",
        Instanceof => "instanceof",
        LShift => "<<",
        RShift => ">>",
        URShift => ">>>",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Exp => "**",
    }
);

operators!(
    /// Operators of a [`LogicalExpression`]
    LogicalOp {
        Or => "||",
        And => "&&",
    }
);

operators!(
    UnaryOp {
        Plus => "+",
        Minus => "-",
        BitNot => "~",
        Not => "!",
    }
);

operators!(
    UpdateOp {
        Increment => "++",
        Decrement => "--",
    }
);

operators!(
    AssignmentOp {
        Assign => "=",
        AddAssign => "+=",
        SubAssign => "-=",
        MulAssign => "*=",
        DivAssign => "/=",
        ModAssign => "%=",
        ExpAssign => "**=",
        LShiftAssign => "<<=",
        RShiftAssign => ">>=",
        URShiftAssign => ">>>=",
        BitAndAssign => "&=",
        BitOrAssign => "|=",
        BitXorAssign => "^=",
    }
);

// ============ NODE VIEW ============

/// Borrowed view of any finished node, handed to a parse delegate
#[derive(Debug, Clone, Copy)]
pub enum Node<'n> {
    Script(&'n Script),
    Comment(&'n CommentNode),
    Identifier(&'n Identifier),
    Literal(&'n Literal),
    AssignmentExpression(&'n AssignmentExpression),
    BinaryExpression(&'n BinaryExpression),
    LogicalExpression(&'n LogicalExpression),
    ConditionalExpression(&'n ConditionalExpression),
    CallExpression(&'n CallExpression),
    SequenceExpression(&'n SequenceExpression),
    UnaryExpression(&'n UnaryExpression),
    UpdateExpression(&'n UpdateExpression),
    FunctionExpression(&'n FunctionExpression),
    FunctionDeclaration(&'n FunctionDeclaration),
    VariableDeclaration(&'n VariableDeclaration),
    VariableDeclarator(&'n VariableDeclarator),
    AssignmentPattern(&'n AssignmentPattern),
    BlockStatement(&'n BlockStatement),
    IfStatement(&'n IfStatement),
    ForStatement(&'n ForStatement),
    WhileStatement(&'n WhileStatement),
    DoWhileStatement(&'n DoWhileStatement),
    ReturnStatement(&'n ReturnStatement),
    BreakStatement(&'n BreakStatement),
    ContinueStatement(&'n ContinueStatement),
    ThrowStatement(&'n ThrowStatement),
    LabeledStatement(&'n LabeledStatement),
    EmptyStatement(&'n EmptyStatement),
    DebuggerStatement(&'n DebuggerStatement),
    ExpressionStatement(&'n ExpressionStatement),
}

/// Wires each node struct to its [`Node`] variant and its location slot.
macro_rules! node_types {
    ($($ty:ident),+ $(,)?) => {
        impl Node<'_> {
            /// The ESTree `type` of the node
            pub fn node_type(&self) -> &'static str {
                match self {
                    Node::Comment(_) => "LineComment",
                    $(Node::$ty(_) => stringify!($ty),)+
                }
            }
        }

        $(
            impl Located for $ty {
                fn location(&self) -> &NodeLocation {
                    &self.location
                }

                fn location_mut(&mut self) -> &mut NodeLocation {
                    &mut self.location
                }
            }

            impl<'n> From<&'n $ty> for Node<'n> {
                fn from(node: &'n $ty) -> Self {
                    Node::$ty(node)
                }
            }
        )+
    };
}

node_types!(
    Script,
    Identifier,
    Literal,
    AssignmentExpression,
    BinaryExpression,
    LogicalExpression,
    ConditionalExpression,
    CallExpression,
    SequenceExpression,
    UnaryExpression,
    UpdateExpression,
    FunctionExpression,
    FunctionDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    AssignmentPattern,
    BlockStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    DoWhileStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    LabeledStatement,
    EmptyStatement,
    DebuggerStatement,
    ExpressionStatement,
);

impl<'n> From<&'n CommentNode> for Node<'n> {
    fn from(node: &'n CommentNode) -> Self {
        Node::Comment(node)
    }
}

impl Statement {
    pub fn location(&self) -> &NodeLocation {
        match self {
            Statement::VariableDeclaration(node) => &node.location,
            Statement::FunctionDeclaration(node) => &node.location,
            Statement::Block(node) => &node.location,
            Statement::If(node) => &node.location,
            Statement::For(node) => &node.location,
            Statement::While(node) => &node.location,
            Statement::DoWhile(node) => &node.location,
            Statement::Return(node) => &node.location,
            Statement::Break(node) => &node.location,
            Statement::Continue(node) => &node.location,
            Statement::Throw(node) => &node.location,
            Statement::Expression(node) => &node.location,
            Statement::Labeled(node) => &node.location,
            Statement::Empty(node) => &node.location,
            Statement::Debugger(node) => &node.location,
        }
    }
}

impl Expression {
    pub fn location(&self) -> &NodeLocation {
        match self {
            Expression::Identifier(node) => &node.location,
            Expression::Literal(node) => &node.location,
            Expression::Assignment(node) => &node.location,
            Expression::Binary(node) => &node.location,
            Expression::Logical(node) => &node.location,
            Expression::Conditional(node) => &node.location,
            Expression::Call(node) => &node.location,
            Expression::Sequence(node) => &node.location,
            Expression::Unary(node) => &node.location,
            Expression::Update(node) => &node.location,
            Expression::Function(node) => &node.location,
        }
    }
}
