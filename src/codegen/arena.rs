//! Arena-owned AST and symbol graph (Design Notes §9).
//!
//! The upstream AST/symbol graph is naturally cyclic (a type's methods
//! point back at the type; a method body's expressions point at the
//! type's fields; an override points at its bridge target). Rather than
//! modeling that with reference-counted or raw-pointer cycles, every node
//! lives in one flat `Vec` per kind and cross-references are newtype
//! indices: `Copy`, cheap, and acyclic as plain data even though the
//! graph they describe has cycles.

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);
    };
}

arena_id!(TypeId);
arena_id!(MethodId);
arena_id!(VarId);
arena_id!(ExprId);
arena_id!(StmtId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Prim),
    Array(TypeId),
    Class,
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub kind: TypeKind,
    pub fqn: String,
    pub num_dimensions: u8,
    pub super_: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    /// Visibility, `FINAL`/`ABSTRACT`/`INTERFACE`/`ENUM`/`ANNOTATION`, and
    /// `SYNTHETIC`, as resolved by the upstream symbol table. `ACC_SUPER`
    /// is added by the class-file writer itself (§3: "set on classes, not
    /// interfaces") rather than stored here.
    pub access: ::basic::AccessFlags,
    /// Generic signature, if the type is a generic declaration or has
    /// generic supertypes; `None` when an erased descriptor suffices.
    pub signature: Option<String>,
    pub enclosing: Option<TypeId>,
    pub fields: Vec<VarId>,
    pub methods: Vec<MethodId>,
    /// Field initializer expressions and instance-initializer blocks, in
    /// declaration order, appended to every constructor's body after its
    /// explicit `this(...)`/`super(...)` call (§4.12 of SPEC_FULL.md).
    pub instance_initializers: Vec<StmtId>,
    /// Static field initializers and static-initializer blocks, in
    /// declaration order, forming the synthesized `<clinit>` body.
    pub static_initializers: Vec<StmtId>,
}

impl TypeSymbol {
    pub fn is_interface(&self) -> bool {
        self.access.contains(::basic::AccessFlags::INTERFACE)
    }

    pub fn is_final(&self) -> bool {
        self.access.contains(::basic::AccessFlags::FINAL)
    }

    pub fn is_abstract(&self) -> bool {
        self.access.contains(::basic::AccessFlags::ABSTRACT)
    }

    pub fn is_enum(&self) -> bool {
        self.access.contains(::basic::AccessFlags::ENUM)
    }

    /// The unqualified simple name, used for `InnerClasses`' `inner_name`
    /// entry: the part of `fqn` after the last `$` (nested type) or `/`
    /// (top-level type).
    pub fn simple_name(&self) -> &str {
        let after_dollar = self.fqn.rsplit('$').next().unwrap_or(&self.fqn);
        after_dollar.rsplit('/').next().unwrap_or(after_dollar)
    }
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub owner: TypeId,
    pub access: ::basic::AccessFlags,
    pub params: Vec<VarId>,
    /// `None` means `void`.
    pub return_type: Option<TypeId>,
    pub throws: Vec<TypeId>,
    /// Set when this method is a synthetic covariant-override bridge;
    /// points at the type-specific method it delegates to.
    pub bridge_target: Option<MethodId>,
    pub is_varargs: bool,
    /// Index of the formal parameter whose erased type needs a
    /// `CHECKCAST` at the bridge call site, if this method is itself a
    /// bridge target reached through a generic erasure boundary.
    pub generic_return_param: Option<u8>,
    pub body: Option<StmtId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOwner {
    Field(TypeId),
    Local,
    Param,
}

#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: TypeId,
    pub access: ::basic::AccessFlags,
    pub constant_value: Option<Literal>,
    /// Assigned local-variable-table index; `None` until the method
    /// emitter allocates it.
    pub local_index: Option<u16>,
    pub owner: VarOwner,
}

/// Tagged union over the literal pools named in Design Notes §9,
/// replacing the source's `DYNAMIC_CAST<LiteralValue*>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Utf8(String),
    Bool(bool),
    Null,
}

/// Expression kinds, one variant per dispatch point in §4.6. Replaces the
/// source's deep `AstX` inheritance with dynamic `Cast()` checks.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    LocalRead(VarId),
    StaticFieldRead(VarId),
    InstanceFieldRead { base: ExprId, field: VarId },
    ArrayRead { array: ExprId, index: ExprId },
    Assign { target: ExprId, value: ExprId },
    CompoundAssign { target: ExprId, op: BinOp, value: ExprId },
    Binary { op: BinOp, left: ExprId, right: ExprId },
    Unary { op: UnOp, operand: ExprId },
    LogicalAnd(ExprId, ExprId),
    LogicalOr(ExprId, ExprId),
    Conditional { cond: ExprId, if_true: ExprId, if_false: ExprId },
    InstanceOf { operand: ExprId, ty: TypeId },
    Cast { ty: TypeId, operand: ExprId },
    New { ty: TypeId, ctor: MethodId, args: Vec<ExprId> },
    NewArray { element_ty: TypeId, dims: Vec<ExprId> },
    ArrayInitializer { element_ty: TypeId, values: Vec<ExprId> },
    MethodCall { receiver: Option<ExprId>, method: MethodId, args: Vec<ExprId> },
    StringConcat(Vec<ExprId>),
    ClassLiteral(TypeId),
    /// An explicit or resolver-synthesized `this(...)`/`super(...)`
    /// constructor delegation; only ever appears as the first statement
    /// of a constructor body (§4.12, "glue that makes constructors
    /// actually emit the initializers"). `is_this` distinguishes the two
    /// so the driver knows whether this class's own instance initializers
    /// still need to run after it (they don't, for a `this(...)` call —
    /// the delegated-to constructor already ran them).
    SuperOrThisCall { is_this: bool, ctor: MethodId, args: Vec<ExprId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
}

/// Statement kinds, one variant per dispatch point in §4.7.
#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Expr(ExprId),
    LocalDecl { var: VarId, init: Option<ExprId> },
    If { cond: ExprId, then: StmtId, else_: Option<StmtId> },
    While { cond: ExprId, body: StmtId, label: Option<String> },
    DoWhile { cond: ExprId, body: StmtId, label: Option<String> },
    For {
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
        label: Option<String>,
    },
    ForEachArray { var: VarId, array: ExprId, body: StmtId, label: Option<String> },
    ForEachIterable { var: VarId, iterable: ExprId, element_ty: TypeId, body: StmtId, label: Option<String> },
    SwitchInt { selector: ExprId, cases: Vec<(Vec<i32>, StmtId)>, default: Option<StmtId> },
    SwitchString { selector: ExprId, cases: Vec<(Vec<String>, StmtId)>, default: Option<StmtId> },
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<ExprId>),
    Throw(ExprId),
    Synchronized { monitor: ExprId, body: StmtId },
    Try {
        resources: Vec<(VarId, ExprId)>,
        body: StmtId,
        catches: Vec<(VarId, Vec<TypeId>, StmtId)>,
        finally: Option<StmtId>,
    },
    Assert { cond: ExprId, message: Option<ExprId> },
}

/// Owns every AST node and symbol for one compilation unit.
#[derive(Debug, Default)]
pub struct Arena {
    types: Vec<TypeSymbol>,
    methods: Vec<MethodSymbol>,
    vars: Vec<VariableSymbol>,
    exprs: Vec<ExprData>,
    stmts: Vec<StmtData>,
}

#[derive(Debug, Clone)]
pub struct ExprData {
    pub kind: ExprKind,
    pub ty: TypeId,
}

#[derive(Debug, Clone)]
pub struct StmtData {
    pub kind: StmtKind,
}

impl Arena {
    pub fn new() -> Arena {
        Arena::default()
    }

    pub fn alloc_type(&mut self, sym: TypeSymbol) -> TypeId {
        self.types.push(sym);
        TypeId(self.types.len() as u32 - 1)
    }

    pub fn alloc_method(&mut self, sym: MethodSymbol) -> MethodId {
        self.methods.push(sym);
        MethodId(self.methods.len() as u32 - 1)
    }

    pub fn alloc_var(&mut self, sym: VariableSymbol) -> VarId {
        self.vars.push(sym);
        VarId(self.vars.len() as u32 - 1)
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        self.exprs.push(ExprData { kind, ty });
        ExprId(self.exprs.len() as u32 - 1)
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind) -> StmtId {
        self.stmts.push(StmtData { kind });
        StmtId(self.stmts.len() as u32 - 1)
    }

    pub fn ty(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0 as usize]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeSymbol {
        &mut self.types[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.0 as usize]
    }

    pub fn var(&self, id: VarId) -> &VariableSymbol {
        &self.vars[id.0 as usize]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VariableSymbol {
        &mut self.vars[id.0 as usize]
    }

    pub fn expr(&self, id: ExprId) -> &ExprData {
        &self.exprs[id.0 as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &StmtData {
        &self.stmts[id.0 as usize]
    }
}

/// Maps a resolved primitive/array/class type to its JVMS §4.3.2
/// descriptor character or shape; used by the descriptor module and by
/// the StackMap generator to pick the right `VerificationType`.
pub fn primitive_descriptor_char(p: Prim) -> char {
    match p {
        Prim::Boolean => 'Z',
        Prim::Byte => 'B',
        Prim::Char => 'C',
        Prim::Short => 'S',
        Prim::Int => 'I',
        Prim::Long => 'J',
        Prim::Float => 'F',
        Prim::Double => 'D',
    }
}

/// `words(type)`: 2 for `long`/`double`, 0 for `void`-shaped absence,
/// 1 otherwise (§4.4).
pub fn prim_words(p: Prim) -> u8 {
    match p {
        Prim::Long | Prim::Double => 2,
        _ => 1,
    }
}
