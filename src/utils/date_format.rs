//! utils/date_format.rs
//! Convierte la fecha de nacimiento al formato que espera la API externa.

/// `YYYY-MM-DD` -> `DD/MM/YYYY`. Lo que ya viene como `D/M/YYYY` se deja igual,
/// y cualquier otra cosa se devuelve sin tocar. Solo se reordenan tres grupos
/// de dígitos; no valida que la fecha exista.
pub fn format_dob(date: Option<&str>) -> Option<String> {
    let date = date.filter(|d| !d.is_empty())?;

    if date.contains('/') {
        match date.split('/').nth(2) {
            Some(year) if year.chars().count() == 4 => return Some(date.to_string()),
            // "a/b" no tiene tercer segmento: se considera ya formateada
            None => return Some(date.to_string()),
            Some(_) => {}
        }
    }

    let parts: Vec<&str> = date.split('-').collect();
    if let [year, month, day] = parts.as_slice() {
        if parts.iter().all(|p| is_digits(p)) {
            return Some(format!("{}/{}/{}", day, month, year));
        }
    }

    Some(date.to_string())
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
}
