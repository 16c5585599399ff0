//! High-level Intermediate Representation.
//!
//! This is the core language left after lowering derived forms away. Children are behind [`Rc`]
//! so that closures and evaluator frames can hold onto pieces of the tree after the declaration
//! that contained them is done running.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use str_util::Name;

pub use sml_fixity::Fixity;
pub use sml_lab::Lab;
pub use sml_scon::SCon;

/// A sequence of declarations.
pub type Decs = Rc<[Dec]>;

// modules //

/// A structure expression.
#[derive(Debug)]
pub struct StrExp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: StrExpKind,
}

/// A kind of structure expression.
#[derive(Debug)]
pub enum StrExpKind {
  /// `struct ... end`.
  Struct(Decs),
  /// A structure name.
  Path(Path),
  /// Ascription.
  Ascription(Rc<StrExp>, Ascription, Rc<SigExp>),
  /// Functor application.
  App(Name, Rc<StrExp>),
  /// `let ... in ... end`.
  Let(Decs, Rc<StrExp>),
}

/// Whether an ascription is transparent or opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ascription {
  /// `:`
  Transparent,
  /// `:>`
  Opaque,
}

/// A signature expression.
#[derive(Debug)]
pub struct SigExp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: SigExpKind,
}

/// A kind of signature expression.
#[derive(Debug)]
pub enum SigExpKind {
  /// `sig ... end`.
  Spec(Vec<Spec>),
  /// A signature name.
  Name(Name),
}

/// A specification.
#[derive(Debug)]
pub struct Spec {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: SpecKind,
}

/// A kind of specification.
#[derive(Debug)]
pub enum SpecKind {
  /// `val`.
  Val(Vec<(Name, Ty)>),
  /// `type` or `eqtype`, with `true` for `eqtype`.
  Ty(Vec<TyDesc>, bool),
  /// `datatype`.
  Datatype(Vec<DatBind>),
  /// `datatype t = datatype u`.
  DatatypeCopy(Name, Path),
  /// `exception`.
  Exception(Vec<ConBind>),
  /// `structure`.
  Structure(Vec<(Name, Rc<SigExp>)>),
  /// `include`.
  Include(Rc<SigExp>),
}

/// A type description.
#[derive(Debug)]
pub struct TyDesc {
  /// The parameters.
  pub ty_vars: Vec<TyVar>,
  /// The name.
  pub name: Name,
  /// The definition, if any.
  pub ty: Option<Ty>,
}

/// A structure binding.
#[derive(Debug)]
pub struct StrBind {
  /// The name.
  pub name: Name,
  /// The value.
  pub str_exp: Rc<StrExp>,
}

/// A signature binding.
#[derive(Debug)]
pub struct SigBind {
  /// The name.
  pub name: Name,
  /// The value.
  pub sig_exp: Rc<SigExp>,
}

/// A functor binding.
#[derive(Debug)]
pub struct FunctorBind {
  /// The functor name.
  pub name: Name,
  /// The parameter name.
  pub param: Name,
  /// The parameter signature.
  pub param_sig: Rc<SigExp>,
  /// The body.
  pub body: Rc<StrExp>,
}

// core //

/// An expression.
#[derive(Debug)]
pub struct Exp {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: ExpKind,
}

/// A kind of expression.
#[derive(Debug)]
pub enum ExpKind {
  /// A constant.
  SCon(SCon),
  /// A value identifier.
  Path(Path),
  /// A record, including tuples and unit.
  Record(Vec<(Lab, Rc<Exp>)>),
  /// `let ... in ... end`.
  Let(Decs, Rc<Exp>),
  /// Application.
  App(Rc<Exp>, Rc<Exp>),
  /// `handle`.
  Handle(Rc<Exp>, Rc<Match>),
  /// `raise`.
  Raise(Rc<Exp>),
  /// `fn`.
  Fn(Rc<Match>),
  /// `e : t`.
  Typed(Rc<Exp>, Ty),
}

/// Where a match came from, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFlavor {
  /// A plain `fn`.
  Fn,
  /// A `case`.
  Case,
  /// A `fun`.
  Fun,
  /// A `handle`.
  Handle,
  /// Lowered from something else that never fails to match, like `if` or `while`.
  Derived,
}

/// A sequence of arms.
#[derive(Debug)]
pub struct Match {
  /// The byte offset of the start.
  pub pos: usize,
  /// The arms.
  pub arms: Vec<Arm>,
  /// Where this came from.
  pub flavor: MatchFlavor,
}

/// A match arm.
#[derive(Debug)]
pub struct Arm {
  /// The pattern.
  pub pat: Pat,
  /// The expression.
  pub exp: Rc<Exp>,
}

/// A declaration.
#[derive(Debug)]
pub struct Dec {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: DecKind,
}

/// A kind of declaration.
#[derive(Debug)]
pub enum DecKind {
  /// `val`, with the explicitly scoped type variables.
  Val(Vec<TyVar>, Vec<ValBind>),
  /// `type`.
  Ty(Vec<TyBind>),
  /// `datatype`.
  Datatype(Vec<DatBind>),
  /// `datatype t = datatype u`.
  DatatypeCopy(Name, Path),
  /// `abstype ... with ... end`.
  Abstype(Vec<DatBind>, Decs),
  /// `exception`.
  Exception(Vec<ExBind>),
  /// `local ... in ... end`.
  Local(Decs, Decs),
  /// `open`.
  Open(Vec<Path>),
  /// `infix`, `infixr`, `nonfix`.
  Fixity(Fixity, Vec<Name>),
  /// `structure`.
  Structure(Vec<StrBind>),
  /// `signature`.
  Signature(Vec<SigBind>),
  /// `functor`.
  Functor(Vec<FunctorBind>),
}

/// A value binding.
#[derive(Debug)]
pub struct ValBind {
  /// Whether this is `rec`.
  pub rec: bool,
  /// The pattern.
  pub pat: Pat,
  /// The expression.
  pub exp: Rc<Exp>,
}

/// A type binding.
#[derive(Debug)]
pub struct TyBind {
  /// The parameters.
  pub ty_vars: Vec<TyVar>,
  /// The name.
  pub name: Name,
  /// The definition.
  pub ty: Ty,
}

/// A datatype binding.
#[derive(Debug)]
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

/// A constructor binding.
#[derive(Debug)]
pub struct ConBind {
  /// The name.
  pub name: Name,
  /// The argument type.
  pub ty: Option<Ty>,
}

/// An exception binding.
#[derive(Debug)]
pub enum ExBind {
  /// A new exception.
  New(Name, Option<Ty>),
  /// A copy of an existing exception.
  Copy(Name, Path),
}

/// A pattern.
#[derive(Debug)]
pub struct Pat {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: PatKind,
}

/// A kind of pattern.
#[derive(Debug)]
pub enum PatKind {
  /// `_`.
  Wild,
  /// A constant.
  SCon(SCon),
  /// A variable, or a constructor, possibly applied to an argument. Which one it is depends on
  /// what the name refers to.
  Con(Path, Option<Box<Pat>>),
  /// A record, with `true` if it may have other rows.
  Record(BTreeMap<Lab, Pat>, bool),
  /// `p : t`.
  Typed(Box<Pat>, Ty),
  /// `x as p`.
  As(Name, Box<Pat>),
}

impl Pat {
  /// Returns the names of all the identifiers that could be variables, in order.
  pub fn idents<'a>(&'a self, ac: &mut Vec<(&'a Name, usize)>) {
    match &self.kind {
      PatKind::Wild | PatKind::SCon(_) => {}
      PatKind::Con(path, arg) => match arg {
        Some(arg) => arg.idents(ac),
        None => {
          if path.prefix.is_empty() {
            ac.push((&path.last, self.pos));
          }
        }
      },
      PatKind::Record(rows, _) => {
        for pat in rows.values() {
          pat.idents(ac);
        }
      }
      PatKind::Typed(pat, _) => pat.idents(ac),
      PatKind::As(name, pat) => {
        ac.push((name, self.pos));
        pat.idents(ac);
      }
    }
  }
}

/// A type.
#[derive(Debug)]
pub struct Ty {
  /// The byte offset of the start.
  pub pos: usize,
  /// The kind.
  pub kind: TyKind,
}

/// A kind of type.
#[derive(Debug)]
pub enum TyKind {
  /// A type variable.
  Var(TyVar),
  /// A record, including tuples.
  Record(BTreeMap<Lab, Ty>),
  /// A type constructor application.
  Con(Vec<Ty>, Path),
  /// A function type.
  Fn(Box<Ty>, Box<Ty>),
}

impl Ty {
  /// Collects the type variables in this, in order, without duplicates.
  pub fn ty_vars<'a>(&'a self, ac: &mut Vec<&'a TyVar>) {
    match &self.kind {
      TyKind::Var(tv) => {
        if !ac.contains(&tv) {
          ac.push(tv);
        }
      }
      TyKind::Record(rows) => {
        for ty in rows.values() {
          ty.ty_vars(ac);
        }
      }
      TyKind::Con(args, _) => {
        for ty in args {
          ty.ty_vars(ac);
        }
      }
      TyKind::Fn(param, res) => {
        param.ty_vars(ac);
        res.ty_vars(ac);
      }
    }
  }
}

/// A possibly qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
  /// The structure names.
  pub prefix: Vec<Name>,
  /// The last name.
  pub last: Name,
}

impl Path {
  /// Returns a new `Path`.
  #[must_use]
  pub fn new(prefix: Vec<Name>, last: Name) -> Self {
    Self { prefix, last }
  }

  /// Returns a `Path` with no prefix.
  #[must_use]
  pub fn one(name: Name) -> Self {
    Self::new(Vec::new(), name)
  }

  /// Returns whether this has no prefix.
  #[must_use]
  pub fn is_one(&self) -> bool {
    self.prefix.is_empty()
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for name in &self.prefix {
      write!(f, "{name}.")?;
    }
    self.last.fmt(f)
  }
}

/// A type variable, like `'a`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyVar(Name);

impl TyVar {
  /// Returns a new `TyVar`.
  #[must_use]
  pub fn new(name: Name) -> Self {
    Self(name)
  }

  /// Returns the name, including the leading `'`s.
  #[must_use]
  pub fn as_name(&self) -> &Name {
    &self.0
  }

  /// Returns whether this is an equality type variable.
  #[must_use]
  pub fn is_equality(&self) -> bool {
    self.0.as_str().starts_with("''")
  }
}

impl fmt::Display for TyVar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// A pattern displayed the way a programmer would write it.
#[derive(Debug, Clone, Copy)]
pub struct PatDisplay<'a> {
  pat: &'a Pat,
  atomic: bool,
}

impl Pat {
  /// Returns a value that displays this.
  #[must_use]
  pub fn display(&self) -> PatDisplay<'_> {
    PatDisplay { pat: self, atomic: false }
  }
}

impl fmt::Display for PatDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.pat.kind {
      PatKind::Wild => f.write_str("_"),
      PatKind::SCon(scon) => scon.fmt(f),
      PatKind::Con(path, None) => path.fmt(f),
      PatKind::Con(path, Some(arg)) => {
        if let (true, Some([lhs, rhs])) = (path.last.as_str() == "::", tuple_pair(arg)) {
          if self.atomic {
            f.write_str("(")?;
          }
          write!(f, "{} :: {}", lhs.display_atomic(), rhs.display())?;
          if self.atomic {
            f.write_str(")")?;
          }
          return Ok(());
        }
        if self.atomic {
          f.write_str("(")?;
        }
        write!(f, "{path} {}", arg.display_atomic())?;
        if self.atomic {
          f.write_str(")")?;
        }
        Ok(())
      }
      PatKind::Record(rows, rest) => {
        if !rest && Lab::is_tuple(rows.keys()) {
          f.write_str("(")?;
          for (idx, pat) in rows.values().enumerate() {
            if idx != 0 {
              f.write_str(", ")?;
            }
            pat.display().fmt(f)?;
          }
          return f.write_str(")");
        }
        f.write_str("{ ")?;
        for (idx, (lab, pat)) in rows.iter().enumerate() {
          if idx != 0 {
            f.write_str(", ")?;
          }
          write!(f, "{lab} = {}", pat.display())?;
        }
        if *rest {
          if !rows.is_empty() {
            f.write_str(", ")?;
          }
          f.write_str("...")?;
        }
        f.write_str(" }")
      }
      PatKind::Typed(pat, _) => PatDisplay { pat, atomic: self.atomic }.fmt(f),
      PatKind::As(name, pat) => {
        if self.atomic {
          f.write_str("(")?;
        }
        write!(f, "{name} as {}", pat.display())?;
        if self.atomic {
          f.write_str(")")?;
        }
        Ok(())
      }
    }
  }
}

impl Pat {
  fn display_atomic(&self) -> PatDisplay<'_> {
    PatDisplay { pat: self, atomic: true }
  }
}

fn tuple_pair(pat: &Pat) -> Option<[&Pat; 2]> {
  match &pat.kind {
    PatKind::Record(rows, false) if rows.len() == 2 => {
      Some([rows.get(&Lab::tuple(0))?, rows.get(&Lab::tuple(1))?])
    }
    _ => None,
  }
}
