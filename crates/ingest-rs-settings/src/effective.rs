//! The merged settings and typed access to them.

use crate::{ResolvedSetting, SettingKey, SettingValue, SettingsError, SourceLayer};
use std::collections::BTreeMap;

/// Merged settings with per-key provenance.
///
/// Immutable once built; a reload produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    entries: BTreeMap<SettingKey, ResolvedSetting>,
}

impl EffectiveConfig {
    pub(crate) fn from_entries(entries: BTreeMap<SettingKey, ResolvedSetting>) -> Self {
        Self { entries }
    }

    /// Typed lookup returning `default` when the key is absent.
    ///
    /// A present value that cannot be coerced to `T` is an error; the caller
    /// decides whether to fall back or abort.
    pub fn get<T: FromSettingValue>(&self, key: &str, default: T) -> Result<T, SettingsError> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// Typed lookup returning `None` when the key is absent.
    pub fn get_opt<T: FromSettingValue>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        let key = SettingKey::parse(key)?;
        let Some(resolved) = self.entries.get(&key) else {
            return Ok(None);
        };
        T::from_setting(&resolved.value)
            .map(Some)
            .ok_or_else(|| SettingsError::TypeMismatch {
                key: key.as_str().to_string(),
                expected: T::EXPECTED,
                found: resolved.value.to_string(),
            })
    }

    /// The winning value and its layer.
    pub fn resolved(&self, key: &str) -> Option<&ResolvedSetting> {
        let key = SettingKey::parse(key).ok()?;
        self.entries.get(&key)
    }

    /// Which layer supplied `key`.
    pub fn provenance(&self, key: &str) -> Option<SourceLayer> {
        self.resolved(key).map(|resolved| resolved.source)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolved(key).is_some()
    }

    /// Entries sorted by canonical key.
    pub fn iter(&self) -> impl Iterator<Item = (&SettingKey, &ResolvedSetting)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Types a setting value can be coerced into.
pub trait FromSettingValue: Sized {
    /// Name used in type mismatch errors.
    const EXPECTED: &'static str;

    /// Coerce `value`, or `None` when it does not fit.
    fn from_setting(value: &SettingValue) -> Option<Self>;
}

impl FromSettingValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(flag) => Some(*flag),
            SettingValue::Str(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

macro_rules! impl_integer_setting {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromSettingValue for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_setting(value: &SettingValue) -> Option<Self> {
                    match value {
                        SettingValue::Int(int) => <$ty>::try_from(*int).ok(),
                        SettingValue::Str(text) => text.trim().parse::<$ty>().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_integer_setting!(i32, i64, u16, u32, u64, usize);

impl FromSettingValue for String {
    const EXPECTED: &'static str = "string";

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Str(text) => Some(text.clone()),
            SettingValue::Bool(flag) => Some(flag.to_string()),
            SettingValue::Int(int) => Some(int.to_string()),
            SettingValue::List(_) => None,
        }
    }
}

impl FromSettingValue for Vec<String> {
    const EXPECTED: &'static str = "list";

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::List(items) => Some(items.clone()),
            SettingValue::Str(text) => Some(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            SettingValue::Bool(flag) => Some(vec![flag.to_string()]),
            SettingValue::Int(int) => Some(vec![int.to_string()]),
        }
    }
}
