//! Enumeraciones con código estable
//!
//! Todas las enumeraciones del dominio se guardan como SMALLINT con un código
//! fijo y se serializan como string snake_case. `coded_enum!` genera el enum
//! junto con `code()`, `label()`, `ALL`, `TryFrom<i16>` y `Display`.

use validator::ValidationError;

/// Error para un código que no pertenece a la enumeración
pub fn unknown_code(enum_name: &'static str, code: i16) -> ValidationError {
    let mut error = ValidationError::new("unknown_code");
    error.add_param("enum".into(), &enum_name);
    error.add_param("code".into(), &code);
    error.message = Some(format!("{} has no variant with code {}", enum_name, code).into());
    error
}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[serde(rename_all = "snake_case")]
        #[repr(i16)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code, )+
        }

        impl $name {
            /// Todas las variantes, en orden de código
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Código entero estable (columna SMALLINT)
            pub fn code(self) -> i16 {
                self as i16
            }

            /// Etiqueta para mostrar
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl TryFrom<i16> for $name {
            type Error = validator::ValidationError;

            fn try_from(code: i16) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err($crate::models::codes::unknown_code(stringify!($name), code)),
                }
            }
        }

        impl From<$name> for i16 {
            fn from(value: $name) -> i16 {
                value.code()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub(crate) use coded_enum;
