//! Function registry.
//!
//! Every callable in an expression is an [`ExprFn`]. Nothing is hardcoded in
//! the parser; names resolve against a [`FunctionRegistry`] at parse time.

use std::collections::HashMap;
use std::sync::Arc;

/// A function that can be called from expressions.
pub trait ExprFn: Send + Sync {
    /// Function name (e.g., "min", "abs").
    fn name(&self) -> &str;

    /// Number of arguments this function expects.
    fn arg_count(&self) -> usize;

    /// Applies the function. `args.len()` always equals [`ExprFn::arg_count`].
    fn call(&self, args: &[i64]) -> i64;
}

/// Registry of expression functions.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    funcs: HashMap<String, Arc<dyn ExprFn>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any previous one with the same name.
    pub fn register<F: ExprFn + 'static>(&mut self, func: F) {
        self.funcs.insert(func.name().to_string(), Arc::new(func));
    }

    /// Gets a function by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ExprFn>> {
        self.funcs.get(name)
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.funcs.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("funcs", &names)
            .finish()
    }
}

macro_rules! define_fn {
    ($name:ident, $str_name:literal, $args:literal, |$($arg:ident),*| $body:expr) => {
        #[doc = concat!("`", $str_name, "` with ", stringify!($args), " argument(s).")]
        pub struct $name;

        impl ExprFn for $name {
            fn name(&self) -> &str { $str_name }
            fn arg_count(&self) -> usize { $args }
            fn call(&self, args: &[i64]) -> i64 {
                let [$($arg),*] = args else { return 0 };
                $body
            }
        }
    };
}

define_fn!(FnMin, "min", 2, |a, b| *a.min(b));
define_fn!(FnMax, "max", 2, |a, b| *a.max(b));
define_fn!(FnAbs, "abs", 1, |a| a.wrapping_abs());
define_fn!(FnSign, "sign", 1, |a| a.signum());

/// `clamp(x, lo, hi)`. Bounds are reordered when `lo > hi` instead of panicking.
pub struct FnClamp;

impl ExprFn for FnClamp {
    fn name(&self) -> &str {
        "clamp"
    }
    fn arg_count(&self) -> usize {
        3
    }
    fn call(&self, args: &[i64]) -> i64 {
        let [x, lo, hi] = args else { return 0 };
        let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
        (*x).clamp(lo, hi)
    }
}

/// Creates a registry with the standard integer functions.
pub fn std_registry() -> FunctionRegistry {
    let mut r = FunctionRegistry::new();
    r.register(FnMin);
    r.register(FnMax);
    r.register(FnAbs);
    r.register(FnSign);
    r.register(FnClamp);
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_registry_contents() {
        let r = std_registry();
        assert_eq!(r.len(), 5);
        for name in ["min", "max", "abs", "sign", "clamp"] {
            assert!(r.get(name).is_some(), "missing {name}");
        }
        assert!(r.get("sin").is_none());
    }

    #[test]
    fn test_clamp_swapped_bounds() {
        assert_eq!(FnClamp.call(&[10, 5, 0]), 5);
        assert_eq!(FnClamp.call(&[-3, 0, 5]), 0);
    }

    #[test]
    fn test_register_replaces() {
        struct Zero;
        impl ExprFn for Zero {
            fn name(&self) -> &str {
                "min"
            }
            fn arg_count(&self) -> usize {
                0
            }
            fn call(&self, _args: &[i64]) -> i64 {
                0
            }
        }

        let mut r = std_registry();
        r.register(Zero);
        assert_eq!(r.get("min").map(|f| f.arg_count()), Some(0));
    }
}
