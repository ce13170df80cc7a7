use im::HashMap as ImHashMap;

use crate::error::EvalError;
use crate::step::DISCARD;
use crate::value::Value;

/// Names visible to a step, persistent so continuations can hold their own snapshot.
#[derive(Clone, Debug, Default)]
pub struct Env {
    values: ImHashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new environment with `name` bound; the discard name binds nothing.
    pub fn with(&self, name: &str, value: Value) -> Env {
        if name == DISCARD {
            return self.clone();
        }
        Env {
            values: self.values.update(name.to_string(), value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Env {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Env::new(), |env, (name, value)| env.with(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_leaves_the_base_untouched() {
        let base = Env::new().with("a", Value::Int(1));
        let extended = base.with("b", Value::Int(2));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.lookup("b"), Ok(Value::Int(2)));
        assert_eq!(
            base.lookup("b"),
            Err(EvalError::UnboundVariable("b".to_string()))
        );
    }

    #[test]
    fn discard_binds_nothing() {
        let env = Env::new().with(DISCARD, Value::Int(1));
        assert!(env.is_empty());
    }
}
