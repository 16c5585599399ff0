//! The state before any SML text has been interpreted.

use crate::config::Options;
use sml_state::{Builtin, Con, Rebind, State, Val};
use sml_statics_types::env::{ConInfo, IdStatus, TyConInfo, TyInfo, ValEnv, ValInfo};
use sml_statics_types::overload::Overload;
use sml_statics_types::ty::{Equality, Ty, TyCon, TyScheme};
use str_util::Name;

/// Exceptions raised by the builtins, or by the language itself, like `Match`. Only `Fail` takes an
/// argument.
const EXCEPTIONS: [&str; 9] =
  ["Match", "Bind", "Div", "Overflow", "Domain", "Subscript", "Size", "Chr", "Fail"];

/// Builtins bound at the top level from the start. The rest are only available through modules.
const CORE: [Builtin; 20] = [
  Builtin::Add,
  Builtin::Sub,
  Builtin::Mul,
  Builtin::Div,
  Builtin::Mod,
  Builtin::RealDiv,
  Builtin::Neg,
  Builtin::Abs,
  Builtin::Lt,
  Builtin::Le,
  Builtin::Gt,
  Builtin::Ge,
  Builtin::Eq,
  Builtin::Ne,
  Builtin::Concat,
  Builtin::Explode,
  Builtin::Implode,
  Builtin::Print,
  Builtin::Assign,
  Builtin::Deref,
];

/// Returns the state with the builtin types, the core operators, and the builtin exceptions.
#[must_use]
pub fn initial_state(options: &Options) -> State {
  let state = State::new();
  for (name, fixity) in sml_fixity::initial() {
    state.set_fixity(name, fixity);
  }
  ty_cons(&state, options);
  for name in ["true", "false", "nil", "::", "ref", "="] {
    state.set_rebind(Name::new(name), Rebind::Never);
  }
  state.set_rebind(Name::new("it"), Rebind::Half);
  for b in CORE {
    set_builtin(&state, Name::new(b.as_str()), b);
  }
  for name in EXCEPTIONS {
    let (ty, val) = if name == "Fail" {
      (Ty::fun(Ty::string(), Ty::exn()), Val::ExnFn(Name::new(name), 0))
    } else {
      (Ty::exn(), Val::exn(name, 0))
    };
    let vi = ValInfo { ty_scheme: TyScheme::zero(ty), id_status: IdStatus::Exn };
    state.set_static_val(Name::new(name), vi);
    state.set_dynamic_val(Name::new(name), val, IdStatus::Exn);
    // so a user's exception with the same name gets a different generation id.
    state.set_counter(Name::new(name), 1);
  }
  state
}

fn ty_cons(state: &State, options: &Options) {
  state.set_static_ty(
    Name::new("unit"),
    TyInfo { ty_scheme: TyScheme::zero(Ty::unit()), val_env: ValEnv::default() },
  );
  let real = if options.real_equality { Equality::Always } else { Equality::Never };
  for (name, equality) in [
    ("int", Equality::Always),
    ("word", Equality::Always),
    ("real", real),
    ("string", Equality::Always),
    ("char", Equality::Always),
    ("exn", Equality::Never),
  ] {
    set_ty(state, name, 0, equality, Vec::new());
  }
  for (name, equality) in [("array", Equality::Always), ("vector", Equality::IfArgs)] {
    set_ty(state, name, 1, equality, Vec::new());
  }
  let bool_cons = ["true", "false"].map(|name| ConInfo { name: Name::new(name), arg: None });
  set_ty(state, "bool", 0, Equality::Always, bool_cons.to_vec());
  for b in [true, false] {
    let name = Name::new(if b { "true" } else { "false" });
    let vi = ValInfo { ty_scheme: TyScheme::zero(Ty::bool()), id_status: IdStatus::Con };
    state.set_static_val(name.clone(), vi);
    state.set_dynamic_val(name, Val::Bool(b), IdStatus::Con);
  }
  state.set_dynamic_ty(Name::new("bool"), vec![Name::new("true"), Name::new("false")]);
  let a = Ty::BoundVar(0);
  let list_cons = vec![
    ConInfo { name: Name::new("nil"), arg: None },
    ConInfo { name: Name::new("::"), arg: Some(Ty::tuple([a.clone(), Ty::list(a.clone())])) },
  ];
  set_ty(state, "list", 1, Equality::IfArgs, list_cons);
  state.set_dynamic_val(
    Name::new("nil"),
    Val::Con(Con { name: Name::new("nil"), id: 0, arg: None }),
    IdStatus::Con,
  );
  state.set_dynamic_val(Name::new("::"), Val::ConFn(Name::new("::"), 0), IdStatus::Con);
  state.set_dynamic_ty(Name::new("list"), vec![Name::new("nil"), Name::new("::")]);
  set_ty(state, "ref", 1, Equality::Always, vec![ConInfo { name: Name::new("ref"), arg: Some(a) }]);
  state.set_dynamic_val(Name::new("ref"), Val::Builtin(Builtin::Ref), IdStatus::Con);
}

/// Declares a builtin type constructor. Its constructors are declared statically too.
fn set_ty(state: &State, name: &'static str, arity: usize, equality: Equality, cons: Vec<ConInfo>) {
  let tc = TyCon::builtin(name);
  let ty_scheme = TyScheme::n_ary(vec![false; arity], tc.clone());
  let mut val_env = ValEnv::default();
  for con in &cons {
    let ty = match &con.arg {
      None => ty_scheme.ty.clone(),
      Some(arg) => Ty::fun(arg.clone(), ty_scheme.ty.clone()),
    };
    let vi = ValInfo {
      ty_scheme: TyScheme { bound: vec![false; arity], overload: None, ty },
      id_status: IdStatus::Con,
    };
    state.set_static_val(con.name.clone(), vi.clone());
    val_env.insert(con.name.clone(), vi);
  }
  state.set_static_ty(Name::new(name), TyInfo { ty_scheme, val_env });
  state.set_ty_con_info(tc, TyConInfo { arity, equality, cons });
}

/// Binds the builtin as a plain value, statically and dynamically.
pub(crate) fn set_builtin(state: &State, name: Name, b: Builtin) {
  let vi = ValInfo { ty_scheme: builtin_ty(b), id_status: IdStatus::Val };
  state.set_static_val(name.clone(), vi);
  state.set_dynamic_val(name, Val::Builtin(b), IdStatus::Val);
}

/// Returns the type of the builtin.
#[must_use]
pub fn builtin_ty(b: Builtin) -> TyScheme {
  let pair = |a: Ty, b: Ty| Ty::tuple([a, b]);
  let bin = |a: Ty| Ty::fun(pair(a.clone(), a.clone()), a);
  let cmp = |a: Ty| Ty::fun(pair(a.clone(), a), Ty::bool());
  match b {
    Builtin::Add | Builtin::Sub | Builtin::Mul => TyScheme::overloaded(Overload::NUM, bin),
    Builtin::Div | Builtin::Mod => TyScheme::overloaded(Overload::WORD_INT, bin),
    Builtin::Neg | Builtin::Abs => {
      TyScheme::overloaded(Overload::REAL_INT, |a| Ty::fun(a.clone(), a))
    }
    Builtin::Lt | Builtin::Le | Builtin::Gt | Builtin::Ge => {
      TyScheme::overloaded(Overload::NUM_TXT, cmp)
    }
    Builtin::Eq | Builtin::Ne => TyScheme::one(true, cmp),
    Builtin::RealDiv | Builtin::Atan2 | Builtin::Pow => TyScheme::zero(bin(Ty::real())),
    Builtin::Concat => TyScheme::zero(bin(Ty::string())),
    Builtin::Andb | Builtin::Orb | Builtin::Xorb | Builtin::Shl | Builtin::Shr => {
      TyScheme::zero(bin(Ty::word()))
    }
    Builtin::Explode => TyScheme::zero(Ty::fun(Ty::string(), Ty::list(Ty::char()))),
    Builtin::Implode => TyScheme::zero(Ty::fun(Ty::list(Ty::char()), Ty::string())),
    Builtin::Print => TyScheme::zero(Ty::fun(Ty::string(), Ty::unit())),
    Builtin::Assign => TyScheme::one(false, |a| Ty::fun(pair(Ty::ref_(a.clone()), a), Ty::unit())),
    Builtin::Deref => TyScheme::one(false, |a| Ty::fun(Ty::ref_(a.clone()), a)),
    Builtin::Ref => TyScheme::one(false, |a| Ty::fun(a.clone(), Ty::ref_(a))),
    Builtin::Ord => TyScheme::zero(Ty::fun(Ty::char(), Ty::int())),
    Builtin::Chr => TyScheme::zero(Ty::fun(Ty::int(), Ty::char())),
    Builtin::Size => TyScheme::zero(Ty::fun(Ty::string(), Ty::int())),
    Builtin::Substring => TyScheme::zero(Ty::fun(
      Ty::tuple([Ty::string(), Ty::int(), Ty::int()]),
      Ty::string(),
    )),
    Builtin::StringSub => TyScheme::zero(Ty::fun(pair(Ty::string(), Ty::int()), Ty::char())),
    Builtin::IntToString => TyScheme::zero(Ty::fun(Ty::int(), Ty::string())),
    Builtin::RealToString => TyScheme::zero(Ty::fun(Ty::real(), Ty::string())),
    Builtin::WordToString => TyScheme::zero(Ty::fun(Ty::word(), Ty::string())),
    Builtin::RealFromInt => TyScheme::zero(Ty::fun(Ty::int(), Ty::real())),
    Builtin::Floor | Builtin::Ceil | Builtin::Round | Builtin::Trunc => {
      TyScheme::zero(Ty::fun(Ty::real(), Ty::int()))
    }
    Builtin::WordFromInt => TyScheme::zero(Ty::fun(Ty::int(), Ty::word())),
    Builtin::WordToInt => TyScheme::zero(Ty::fun(Ty::word(), Ty::int())),
    Builtin::Sqrt
    | Builtin::Sin
    | Builtin::Cos
    | Builtin::Tan
    | Builtin::Asin
    | Builtin::Acos
    | Builtin::Atan
    | Builtin::Exp
    | Builtin::Ln
    | Builtin::Log10 => TyScheme::zero(Ty::fun(Ty::real(), Ty::real())),
  }
}
