//! Library modules, written in SML, with native primitives where SML cannot express something.

use crate::config::Options;
use crate::error::Error;
use crate::initial::{builtin_ty, initial_state, set_builtin};
use sml_state::{Builtin, DynEnv, State, Val};
use sml_statics_types::env::{Env, IdStatus, ValInfo};
use str_util::Name;

/// A library module.
#[derive(Debug)]
struct Module {
  name: &'static str,
  /// Installed before the text runs. A builtin named like `A.b` goes in structure `A`.
  natives: &'static [Builtin],
  text: &'static str,
}

const BASE: &str = "__Base";

const MODULES: [Module; 9] = [
  Module {
    name: BASE,
    natives: &[
      Builtin::Ord,
      Builtin::Chr,
      Builtin::Size,
      Builtin::Substring,
      Builtin::RealFromInt,
      Builtin::Floor,
      Builtin::Ceil,
      Builtin::Round,
      Builtin::Trunc,
    ],
    text: include_str!("modules/base.sml"),
  },
  Module { name: "Int", natives: &[Builtin::IntToString], text: include_str!("modules/int.sml") },
  Module {
    name: "Real",
    natives: &[Builtin::RealToString],
    text: include_str!("modules/real.sml"),
  },
  Module {
    name: "Math",
    natives: &[
      Builtin::Sqrt,
      Builtin::Sin,
      Builtin::Cos,
      Builtin::Tan,
      Builtin::Asin,
      Builtin::Acos,
      Builtin::Atan,
      Builtin::Atan2,
      Builtin::Exp,
      Builtin::Ln,
      Builtin::Log10,
      Builtin::Pow,
    ],
    text: include_str!("modules/math.sml"),
  },
  Module { name: "Char", natives: &[], text: include_str!("modules/char.sml") },
  Module {
    name: "String",
    natives: &[Builtin::StringSub],
    text: include_str!("modules/string.sml"),
  },
  Module { name: "List", natives: &[], text: include_str!("modules/list.sml") },
  Module { name: "Option", natives: &[], text: include_str!("modules/option.sml") },
  Module {
    name: "Word",
    natives: &[
      Builtin::WordToString,
      Builtin::WordFromInt,
      Builtin::WordToInt,
      Builtin::Andb,
      Builtin::Orb,
      Builtin::Xorb,
      Builtin::Shl,
      Builtin::Shr,
    ],
    text: include_str!("modules/word.sml"),
  },
];

/// Returns the names of the modules that may be passed to [`first_state`].
#[must_use]
pub fn available_modules() -> Vec<&'static str> {
  MODULES.iter().map(|m| m.name).filter(|name| !name.starts_with('_')).collect()
}

/// Returns the initial state with the base library and the modules loaded, in order.
///
/// # Errors
///
/// If a module name is unknown, or a module failed to load.
pub fn first_state(modules: &[&str], options: &Options) -> Result<State, Error> {
  elapsed::log("sml_interp::first_state", || {
    let mut state = initial_state(options);
    let names = std::iter::once(BASE).chain(modules.iter().copied().filter(|&name| name != BASE));
    for name in names {
      let Some(module) = MODULES.iter().find(|m| m.name == name) else {
        return Err(Error::internal(format!("no module named {name}")));
      };
      state = load(&state, module, options)?;
    }
    Ok(state)
  })
}

fn load(state: &State, module: &Module, options: &Options) -> Result<State, Error> {
  log::debug!("load module {}", module.name);
  let scope = state.nested();
  let mut structures = Vec::<(Name, Env, DynEnv)>::new();
  for &b in module.natives {
    let Some((str_name, name)) = b.as_str().rsplit_once('.') else {
      set_builtin(&scope, Name::new(b.as_str()), b);
      continue;
    };
    let idx = match structures.iter().position(|(s, _, _)| s.as_str() == str_name) {
      Some(idx) => idx,
      None => {
        structures.push((Name::new(str_name), Env::default(), DynEnv::default()));
        structures.len() - 1
      }
    };
    let (_, env, dyn_env) = &mut structures[idx];
    let vi = ValInfo { ty_scheme: builtin_ty(b), id_status: IdStatus::Val };
    env.val_env.insert(Name::new(name), vi);
    dyn_env.val_env.insert(Name::new(name), (Val::Builtin(b), IdStatus::Val));
  }
  for (name, env, dyn_env) in structures {
    scope.set_static_str(name.clone(), env);
    scope.set_dynamic_str(name, dyn_env);
  }
  let interpreted = crate::interpret(module.text, &scope, options)
    .map_err(|e| Error::internal(format!("module {}: {e}", module.name)))?;
  if let Some(val) = interpreted.error {
    let val = sml_state::display_val(&val);
    return Err(Error::internal(format!("module {} raised {val}", module.name)));
  }
  Ok(interpreted.state)
}
