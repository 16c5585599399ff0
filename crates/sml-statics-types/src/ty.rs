//! Types and type schemes.

use crate::overload::Overload;
use sml_lab::Lab;
use std::collections::BTreeMap;
use str_util::Name;

/// A type.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
  /// A variable bound by a [`TyScheme`], as an index into its binder.
  BoundVar(usize),
  /// A variable to be solved by unification.
  MetaVar(MetaVar),
  /// A type variable written by the user, like `'a`.
  FixedVar(FixedVar),
  /// A record type. Tuples are records with labels `1..n`.
  Record(RecordTy),
  /// A type constructor applied to arguments, like `int list`.
  Con(Vec<Ty>, TyCon),
  /// A function type.
  Fn(Box<Ty>, Box<Ty>),
}

/// The rows of a record type.
pub type RecordTy = BTreeMap<Lab, Ty>;

impl Ty {
  /// Returns a nullary builtin type.
  #[must_use]
  pub fn builtin(name: &'static str) -> Self {
    Self::Con(Vec::new(), TyCon::builtin(name))
  }

  /// Returns `unit`.
  #[must_use]
  pub fn unit() -> Self {
    Self::Record(RecordTy::new())
  }

  /// Returns `int`.
  #[must_use]
  pub fn int() -> Self {
    Self::builtin("int")
  }

  /// Returns `word`.
  #[must_use]
  pub fn word() -> Self {
    Self::builtin("word")
  }

  /// Returns `real`.
  #[must_use]
  pub fn real() -> Self {
    Self::builtin("real")
  }

  /// Returns `string`.
  #[must_use]
  pub fn string() -> Self {
    Self::builtin("string")
  }

  /// Returns `char`.
  #[must_use]
  pub fn char() -> Self {
    Self::builtin("char")
  }

  /// Returns `bool`.
  #[must_use]
  pub fn bool() -> Self {
    Self::builtin("bool")
  }

  /// Returns `exn`.
  #[must_use]
  pub fn exn() -> Self {
    Self::builtin("exn")
  }

  /// Returns `ty list`.
  #[must_use]
  pub fn list(ty: Ty) -> Self {
    Self::Con(vec![ty], TyCon::builtin("list"))
  }

  /// Returns `ty ref`.
  #[must_use]
  pub fn ref_(ty: Ty) -> Self {
    Self::Con(vec![ty], TyCon::builtin("ref"))
  }

  /// Returns `param -> res`.
  #[must_use]
  pub fn fun(param: Ty, res: Ty) -> Self {
    Self::Fn(Box::new(param), Box::new(res))
  }

  /// Returns the tuple type of the types.
  #[must_use]
  pub fn tuple<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Ty>,
  {
    Self::Record(iter.into_iter().enumerate().map(|(idx, ty)| (Lab::tuple(idx), ty)).collect())
  }

  /// Replaces each bound variable `i` with `args[i]`.
  #[must_use]
  pub fn apply_bv(&self, args: &[Ty]) -> Ty {
    match self {
      Ty::BoundVar(idx) => args.get(*idx).cloned().unwrap_or_else(|| self.clone()),
      Ty::MetaVar(_) | Ty::FixedVar(_) => self.clone(),
      Ty::Record(rows) => {
        Ty::Record(rows.iter().map(|(lab, ty)| (lab.clone(), ty.apply_bv(args))).collect())
      }
      Ty::Con(con_args, tc) => {
        Ty::Con(con_args.iter().map(|ty| ty.apply_bv(args)).collect(), tc.clone())
      }
      Ty::Fn(param, res) => Ty::fun(param.apply_bv(args), res.apply_bv(args)),
    }
  }

  /// Calls `f` on every type constructor in this.
  pub fn ty_cons<F>(&self, f: &mut F)
  where
    F: FnMut(&TyCon),
  {
    match self {
      Ty::BoundVar(_) | Ty::MetaVar(_) | Ty::FixedVar(_) => {}
      Ty::Record(rows) => {
        for ty in rows.values() {
          ty.ty_cons(f);
        }
      }
      Ty::Con(args, tc) => {
        f(tc);
        for ty in args {
          ty.ty_cons(f);
        }
      }
      Ty::Fn(param, res) => {
        param.ty_cons(f);
        res.ty_cons(f);
      }
    }
  }

  /// Replaces every type constructor `tc` for which `f(tc)` is `Some` with what it returns, a type
  /// function to apply to the arguments.
  #[must_use]
  pub fn realize<F>(&self, f: &F) -> Ty
  where
    F: Fn(&TyCon) -> Option<TyScheme>,
  {
    match self {
      Ty::BoundVar(_) | Ty::MetaVar(_) | Ty::FixedVar(_) => self.clone(),
      Ty::Record(rows) => {
        Ty::Record(rows.iter().map(|(lab, ty)| (lab.clone(), ty.realize(f))).collect())
      }
      Ty::Con(args, tc) => {
        let args: Vec<_> = args.iter().map(|ty| ty.realize(f)).collect();
        match f(tc) {
          Some(scheme) => scheme.ty.apply_bv(&args),
          None => Ty::Con(args, tc.clone()),
        }
      }
      Ty::Fn(param, res) => Ty::fun(param.realize(f), res.realize(f)),
    }
  }
}

/// A type constructor, identified by its name and a generation id.
///
/// Two `datatype t` declarations make type constructors with the same name but different ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyCon {
  /// The name.
  pub name: Name,
  /// The generation id.
  pub id: u32,
}

impl TyCon {
  /// Returns a builtin type constructor. These all have id 0.
  #[must_use]
  pub fn builtin(name: &'static str) -> Self {
    Self { name: Name::new(name), id: 0 }
  }

  /// Returns whether this is builtin.
  #[must_use]
  pub fn is_builtin(&self) -> bool {
    self.id == 0
  }
}

/// A meta variable, an index into a [`crate::subst::Subst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetaVar(pub(crate) u32);

/// A type variable written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedVar {
  /// Distinguishes fixed variables with the same name from different scopes.
  pub id: u32,
  /// The name, including the leading `'`s.
  pub name: Name,
}

impl FixedVar {
  /// Returns whether this is an equality type variable.
  #[must_use]
  pub fn is_equality(&self) -> bool {
    self.name.as_str().starts_with("''")
  }
}

/// A type scheme, a type with some variables bound, like `'a -> 'a`.
///
/// Also used as a type function, where the bound variables are the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TyScheme {
  /// For each bound variable, whether it is an equality variable.
  pub bound: Vec<bool>,
  /// If set, every bound variable may only be instantiated to a member of this. Only the
  /// overloaded builtin operators have this.
  pub overload: Option<Overload>,
  /// The type.
  pub ty: Ty,
}

impl TyScheme {
  /// Returns a scheme that binds no variables.
  #[must_use]
  pub fn zero(ty: Ty) -> Self {
    Self { bound: Vec::new(), overload: None, ty }
  }

  /// Returns a scheme for an n-ary type constructor applied to its parameters.
  #[must_use]
  pub fn n_ary(bound: Vec<bool>, tc: TyCon) -> Self {
    let args = (0..bound.len()).map(Ty::BoundVar).collect();
    Self { bound, overload: None, ty: Ty::Con(args, tc) }
  }

  /// Returns one type variable, `'a`, and `f('a)`.
  #[must_use]
  pub fn one<F>(equality: bool, f: F) -> Self
  where
    F: FnOnce(Ty) -> Ty,
  {
    Self { bound: vec![equality], overload: None, ty: f(Ty::BoundVar(0)) }
  }

  /// Returns one type variable restricted to the overload, `'a`, and `f('a)`.
  #[must_use]
  pub fn overloaded<F>(overload: Overload, f: F) -> Self
  where
    F: FnOnce(Ty) -> Ty,
  {
    Self { bound: vec![false], overload: Some(overload), ty: f(Ty::BoundVar(0)) }
  }

  /// Returns the type function application of this to `args`.
  #[must_use]
  pub fn apply(&self, args: &[Ty]) -> Ty {
    self.ty.apply_bv(args)
  }
}

/// Whether a type constructor admits equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
  /// Always, regardless of arguments, like `ref`.
  Always,
  /// Never, like `exn` or functions.
  Never,
  /// Iff all the arguments do, like `list`.
  IfArgs,
}
