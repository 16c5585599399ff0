//! The surface syntax tree, as produced by the parser.
//!
//! Infix applications are already resolved, but derived forms (tuples, lists, `fun`, `if`,
//! `while`, etc.) are still present. See `sml-hir-lower` for lowering them away.

use str_util::Name;

pub use sml_lab::Lab;
pub use sml_scon::SCon;

/// A possibly qualified name, like `x` or `List.map`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
  /// The structure names before the last name.
  pub prefix: Vec<Name>,
  /// The last name.
  pub last: Name,
}

impl Path {
  /// Returns a path with no prefix.
  #[must_use]
  pub fn one(name: Name) -> Self {
    Self { prefix: Vec::new(), last: name }
  }

  /// Returns the name if there is no prefix.
  #[must_use]
  pub fn as_one(&self) -> Option<&Name> {
    self.prefix.is_empty().then_some(&self.last)
  }
}

impl std::fmt::Display for Path {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for name in &self.prefix {
      write!(f, "{name}.")?;
    }
    self.last.fmt(f)
  }
}

/// A type variable, like `'a` or `''b`.
pub type TyVar = Name;

// modules //

/// A top-level declaration. Expressions at the top level are already wrapped as `val it = e`.
pub type TopDec = Dec;

/// A declaration allowed at the top level or in a structure.
#[derive(Debug, Clone)]
pub struct Dec {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: DecKind,
}

/// A kind of declaration.
#[derive(Debug, Clone)]
pub enum DecKind {
  /// `val`.
  Val(Vec<TyVar>, Vec<ValBind>),
  /// `fun`.
  Fun(Vec<TyVar>, Vec<FunBind>),
  /// `type`.
  Ty(Vec<TyBind>),
  /// `datatype`.
  Datatype(Vec<DatBind>),
  /// `datatype t = datatype u`.
  DatatypeCopy(Name, Path),
  /// `abstype ... with ... end`.
  Abstype(Vec<DatBind>, Vec<Dec>),
  /// `exception`.
  Exception(Vec<ExBind>),
  /// `local ... in ... end`.
  Local(Vec<Dec>, Vec<Dec>),
  /// `open`.
  Open(Vec<Path>),
  /// `infix`.
  Infix(u16, Vec<Name>),
  /// `infixr`.
  Infixr(u16, Vec<Name>),
  /// `nonfix`.
  Nonfix(Vec<Name>),
  /// `do`, a Successor ML expression declaration.
  Do(Exp),
  /// `structure`.
  Structure(Vec<StrBind>),
  /// `signature`.
  Signature(Vec<SigBind>),
  /// `functor`.
  Functor(Vec<FunctorBind>),
}

/// A structure binding.
#[derive(Debug, Clone)]
pub struct StrBind {
  /// The name.
  pub name: Name,
  /// The value.
  pub str_exp: StrExp,
}

/// A structure expression.
#[derive(Debug, Clone)]
pub struct StrExp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: StrExpKind,
}

/// A kind of structure expression.
#[derive(Debug, Clone)]
pub enum StrExpKind {
  /// `struct ... end`.
  Struct(Vec<Dec>),
  /// A structure name.
  Path(Path),
  /// Signature ascription, `S : SIG` or `S :> SIG`.
  Ascription(Box<StrExp>, Ascription, SigExp),
  /// A functor application.
  App(Name, Box<StrExp>),
  /// `let ... in ... end`.
  Let(Vec<Dec>, Box<StrExp>),
}

/// Whether an ascription is transparent or opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ascription {
  /// `:`
  Transparent,
  /// `:>`
  Opaque,
}

/// A signature binding.
#[derive(Debug, Clone)]
pub struct SigBind {
  /// The name.
  pub name: Name,
  /// The value.
  pub sig_exp: SigExp,
}

/// A signature expression.
#[derive(Debug, Clone)]
pub struct SigExp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: SigExpKind,
}

/// A kind of signature expression.
#[derive(Debug, Clone)]
pub enum SigExpKind {
  /// `sig ... end`.
  Spec(Vec<Spec>),
  /// A signature name.
  Name(Name),
}

/// A functor binding.
#[derive(Debug, Clone)]
pub struct FunctorBind {
  /// The functor name.
  pub name: Name,
  /// The parameter name.
  pub param: Name,
  /// The parameter signature.
  pub param_sig: SigExp,
  /// The body, with any result ascription already applied.
  pub body: StrExp,
}

/// A specification in a signature.
#[derive(Debug, Clone)]
pub struct Spec {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: SpecKind,
}

/// A kind of specification.
#[derive(Debug, Clone)]
pub enum SpecKind {
  /// `val x : t`.
  Val(Vec<(Name, Ty)>),
  /// `type t` or `type t = u`.
  Ty(Vec<TyDesc>),
  /// `eqtype t`.
  EqTy(Vec<TyDesc>),
  /// `datatype`.
  Datatype(Vec<DatBind>),
  /// `datatype t = datatype u`.
  DatatypeCopy(Name, Path),
  /// `exception`.
  Exception(Vec<ConBind>),
  /// `structure S : SIG`.
  Structure(Vec<(Name, SigExp)>),
  /// `include SIG`.
  Include(SigExp),
}

/// A type description in a signature.
#[derive(Debug, Clone)]
pub struct TyDesc {
  /// The parameters.
  pub ty_vars: Vec<TyVar>,
  /// The name.
  pub name: Name,
  /// The definition, if any.
  pub ty: Option<Ty>,
}

// core //

/// An expression.
#[derive(Debug, Clone)]
pub struct Exp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: ExpKind,
}

/// A kind of expression.
#[derive(Debug, Clone)]
pub enum ExpKind {
  /// A constant.
  SCon(SCon),
  /// A value identifier.
  Path(Path),
  /// `{ a = e, ... }`.
  Record(Vec<(Lab, Exp)>),
  /// `#lab`.
  Selector(Lab),
  /// `(e1, e2, ...)`, including `()`.
  Tuple(Vec<Exp>),
  /// `[e1, e2, ...]`.
  List(Vec<Exp>),
  /// `(e1; e2; ...)`.
  Seq(Vec<Exp>),
  /// `let ... in e1; e2; ... end`.
  Let(Vec<Dec>, Vec<Exp>),
  /// Application, including resolved infix application.
  App(Box<Exp>, Box<Exp>),
  /// A resolved infix application, kept apart from [`ExpKind::App`] for display.
  Infix(Box<Exp>, Path, Box<Exp>),
  /// `e : t`.
  Typed(Box<Exp>, Ty),
  /// `andalso`.
  Andalso(Box<Exp>, Box<Exp>),
  /// `orelse`.
  Orelse(Box<Exp>, Box<Exp>),
  /// `handle`.
  Handle(Box<Exp>, Vec<Arm>),
  /// `raise`.
  Raise(Box<Exp>),
  /// `if`, with a missing `else` allowed only in Successor ML.
  If(Box<Exp>, Box<Exp>, Option<Box<Exp>>),
  /// `while`.
  While(Box<Exp>, Box<Exp>),
  /// `case`.
  Case(Box<Exp>, Vec<Arm>),
  /// `fn`.
  Fn(Vec<Arm>),
}

/// A match arm, `pat => exp`.
#[derive(Debug, Clone)]
pub struct Arm {
  /// The pattern.
  pub pat: Pat,
  /// The expression.
  pub exp: Exp,
}

/// A `val` binding.
#[derive(Debug, Clone)]
pub struct ValBind {
  /// Whether `rec` was written, on this binding or a previous one in the same `val`.
  pub rec: bool,
  /// The pattern.
  pub pat: Pat,
  /// The expression.
  pub exp: Exp,
}

/// A `fun` binding, one function with some clauses.
#[derive(Debug, Clone)]
pub struct FunBind {
  /// The byte offset of the start.
  pub pos: usize,
  /// The clauses.
  pub clauses: Vec<FunClause>,
}

/// A `fun` clause.
#[derive(Debug, Clone)]
pub struct FunClause {
  /// The byte offset of the start.
  pub pos: usize,
  /// The function name.
  pub name: Path,
  /// The curried argument patterns. For the infix form, this is one tuple pattern followed by the
  /// rest.
  pub pats: Vec<Pat>,
  /// The result type annotation.
  pub ret_ty: Option<Ty>,
  /// The body.
  pub body: Exp,
}

/// A `type` binding.
#[derive(Debug, Clone)]
pub struct TyBind {
  /// The parameters.
  pub ty_vars: Vec<TyVar>,
  /// The name.
  pub name: Name,
  /// The definition.
  pub ty: Ty,
}

/// A `datatype` binding.
#[derive(Debug, Clone)]
pub struct DatBind {
  /// The byte offset of the start.
  pub pos: usize,
  /// The parameters.
  pub ty_vars: Vec<TyVar>,
  /// The name.
  pub name: Name,
  /// The constructors.
  pub cons: Vec<ConBind>,
}

/// A constructor binding, also used for exception specs.
#[derive(Debug, Clone)]
pub struct ConBind {
  /// The name.
  pub name: Name,
  /// The argument type.
  pub ty: Option<Ty>,
}

/// An exception binding.
#[derive(Debug, Clone)]
pub enum ExBind {
  /// `exception E` or `exception E of t`.
  New(Name, Option<Ty>),
  /// `exception E = F`.
  Copy(Name, Path),
}

/// A pattern.
#[derive(Debug, Clone)]
pub struct Pat {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: PatKind,
}

/// A kind of pattern.
#[derive(Debug, Clone)]
pub enum PatKind {
  /// `_`.
  Wild,
  /// A constant.
  SCon(SCon),
  /// An identifier, which may be a variable or a nullary constructor.
  Path(Path),
  /// `{ a = p, ... }`, with `true` if there was a `...` row.
  Record(Vec<(Lab, Pat)>, bool),
  /// `(p1, p2, ...)`, including `()`.
  Tuple(Vec<Pat>),
  /// `[p1, p2, ...]`.
  List(Vec<Pat>),
  /// A constructor applied to an argument.
  Con(Path, Box<Pat>),
  /// A resolved infix constructor application.
  Infix(Box<Pat>, Path, Box<Pat>),
  /// `p : t`.
  Typed(Box<Pat>, Ty),
  /// `x as p`.
  As(Name, Box<Pat>),
}

/// A type.
#[derive(Debug, Clone)]
pub struct Ty {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: TyKind,
}

/// A kind of type.
#[derive(Debug, Clone)]
pub enum TyKind {
  /// A type variable.
  Var(TyVar),
  /// `{ a : t, ... }`.
  Record(Vec<(Lab, Ty)>),
  /// `t1 * t2 * ...`.
  Tuple(Vec<Ty>),
  /// A type constructor applied to arguments.
  Con(Vec<Ty>, Path),
  /// `t1 -> t2`.
  Fn(Box<Ty>, Box<Ty>),
}
