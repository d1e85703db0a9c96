use std::collections::HashMap;

use serde_json::Value;

use super::error::{ApiError, TypeError};

pub type FormData = HashMap<String, Value>;

/// Decodes a raw request body into a JSON object.
pub fn decode_form(body: &[u8]) -> Result<FormData, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// A decoded JSON object body, queried field by field.
pub struct Form {
    inner: FormData,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    /// `Ok(None)` when the key is absent. Explicit nulls are rejected.
    pub fn get_optional<T, F>(&self, key: &str, parse: F) -> Result<Option<T>, TypeError>
    where
        F: FnOnce(Value) -> Result<T, TypeError>,
    {
        match self.inner.get(key) {
            Some(Value::Null) => Err(TypeError::null()),
            Some(value) => parse(value.to_owned()).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_value<T, F>(&self, key: &str, parse: F) -> Result<T, TypeError>
    where
        F: FnOnce(Value) -> Result<T, TypeError>,
    {
        self.get_optional(key, parse)?
            .ok_or_else(TypeError::required)
    }

    /// Required unless `partial`, in which case an absent key yields `None`.
    pub fn get_field<T, F>(&self, key: &str, partial: bool, parse: F) -> Result<Option<T>, TypeError>
    where
        F: FnOnce(Value) -> Result<T, TypeError>,
    {
        if partial {
            self.get_optional(key, parse)
        } else {
            self.get_value(key, parse).map(Some)
        }
    }
}

pub fn char_field(max_length: usize, allow_blank: bool) -> impl Fn(Value) -> Result<String, TypeError> {
    move |value| {
        let value = match value {
            Value::String(value) => value.trim().to_string(),
            Value::Number(value) => value.to_string(),
            _ => return Err(TypeError::new("Not a valid string.")),
        };

        if value.is_empty() && !allow_blank {
            return Err(TypeError::blank());
        }
        if value.chars().count() > max_length {
            return Err(TypeError::new(&format!(
                "Ensure this field has no more than {max_length} characters."
            )));
        }

        Ok(value)
    }
}

pub fn integer_field(value: Value) -> Result<i32, TypeError> {
    let invalid = || TypeError::new("A valid integer is required.");

    let number = match &value {
        Value::Number(n) => match n.as_i64() {
            Some(n) => n,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                _ => return Err(invalid()),
            },
        },
        Value::String(s) => {
            let s = s.trim();
            let s = match s.split_once('.') {
                Some((whole, zeros)) if zeros.bytes().all(|b| b == b'0') => whole,
                _ => s,
            };
            s.parse::<i64>().map_err(|_| invalid())?
        }
        _ => return Err(invalid()),
    };

    if number > i32::MAX as i64 {
        return Err(TypeError::new(&format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        )));
    }
    if number < i32::MIN as i64 {
        return Err(TypeError::new(&format!(
            "Ensure this value is greater than or equal to {}.",
            i32::MIN
        )));
    }

    Ok(number as i32)
}

/// Lowercases the domain part of an address that looks like `local@domain`.
pub fn email_field(value: Value) -> Result<String, TypeError> {
    let value = char_field(255, false)(value)?;

    match value.rsplit_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace) =>
        {
            Ok(format!("{local}@{}", domain.to_lowercase()))
        }
        _ => Err(TypeError::new("Enter a valid email address.")),
    }
}

pub fn password_field(min_length: usize) -> impl Fn(Value) -> Result<String, TypeError> {
    move |value| {
        let value = match value {
            Value::String(value) => value,
            _ => return Err(TypeError::new("Not a valid string.")),
        };

        if value.is_empty() {
            return Err(TypeError::blank());
        }
        if value.chars().count() < min_length {
            return Err(TypeError::new(&format!(
                "Ensure this field has at least {min_length} characters."
            )));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(value: Value) -> Form {
        Form::from_data(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn absent_null_and_present_fields() {
        let form = form(json!({ "title": "Soup", "link": null }));
        let text = char_field(255, true);

        assert_eq!(form.get_optional("title", &text).unwrap().as_deref(), Some("Soup"));
        assert_eq!(form.get_optional("missing", &text).unwrap(), None);
        assert_eq!(form.get_optional("link", &text).unwrap_err(), TypeError::null());
        assert_eq!(form.get_value("missing", &text).unwrap_err(), TypeError::required());
        assert_eq!(form.get_field("missing", true, &text).unwrap(), None);
        assert!(form.get_field("missing", false, &text).is_err());
    }

    #[test]
    fn char_field_trims_and_limits() {
        let title = char_field(5, false);

        assert_eq!(title(json!("  pie ")).unwrap(), "pie");
        assert_eq!(title(json!(12)).unwrap(), "12");
        assert_eq!(title(json!("   ")).unwrap_err(), TypeError::blank());
        assert_eq!(
            title(json!("lasagne")).unwrap_err().to_string(),
            "Ensure this field has no more than 5 characters."
        );
        assert_eq!(title(json!(["a"])).unwrap_err().to_string(), "Not a valid string.");
        assert_eq!(char_field(5, true)(json!("")).unwrap(), "");
    }

    #[test]
    fn integer_field_accepts_integral_input() {
        assert_eq!(integer_field(json!(30)).unwrap(), 30);
        assert_eq!(integer_field(json!("45")).unwrap(), 45);
        assert_eq!(integer_field(json!("10.0")).unwrap(), 10);
        assert_eq!(integer_field(json!(5.0)).unwrap(), 5);
        assert!(integer_field(json!(5.5)).is_err());
        assert!(integer_field(json!("ten")).is_err());
        assert!(integer_field(json!(true)).is_err());
        assert!(integer_field(json!(3_000_000_000_i64)).is_err());
    }

    #[test]
    fn email_field_normalizes_domain() {
        assert_eq!(
            email_field(json!("Test@EXAMPLE.com")).unwrap(),
            "Test@example.com"
        );
        assert!(email_field(json!("not-an-email")).is_err());
        assert!(email_field(json!("a@b")).is_err());
        assert!(email_field(json!("a b@example.com")).is_err());
    }

    #[test]
    fn password_field_enforces_minimum() {
        let password = password_field(5);

        assert_eq!(password(json!(" secret ")).unwrap(), " secret ");
        assert_eq!(
            password(json!("pw")).unwrap_err().to_string(),
            "Ensure this field has at least 5 characters."
        );
    }

    #[test]
    fn decode_form_requires_a_json_object() {
        let data = decode_form(br#"{"title": "Soup"}"#).unwrap();
        assert_eq!(data["title"], json!("Soup"));

        for body in ["{", "[]", ""] {
            let err = decode_form(body.as_bytes()).unwrap_err();
            assert!(err.to_string().starts_with("JSON parse error - "));
        }
    }
}
