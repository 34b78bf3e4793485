//! Constantes del motor core.
//!
//! Valores estáticos que participan en el cálculo del hash de definición de
//! una cadena. Un cambio de versión del engine invalida los hashes aunque la
//! definición de steps no cambie.

/// Versión lógica del motor. Se incluye en el input del hash de definición
/// para que cadenas idénticas ejecutadas por motores incompatibles no
/// compartan identidad. Mantener estable mientras no haya cambios
/// incompatibles en la semántica de ejecución.
pub const ENGINE_VERSION: &str = "1.0";
