use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Generation knobs ───────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Casual,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Plain,
}

// ─── Nested profile structs ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// The sender's profile, as embedded in every generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "contact_info")]
    pub contact: ContactInfo,
}

/// The recipient's profile. Unlike the sender it carries a company name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, rename = "contact_info")]
    pub contact: ContactInfo,
}

// ─── Parameter store ────────────────────────────────────────────────────────

/// Structured inputs that parameterize a generation request.
///
/// Owned exclusively by the session and mutated through [`set`](Self::set)
/// (leaf text fields) or the typed setters. A leaf write never touches its
/// sibling fields. Serializes to the wire shape the generation API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailParameters {
    pub sales_info: SalesInfo,
    pub customer_info: CustomerInfo,
    #[serde(rename = "emailContext")]
    pub email_context: String,
    pub tone: Tone,
    pub length: Length,
    #[serde(rename = "outputFormat")]
    pub output_format: OutputFormat,
    /// Selected model name; `None` until the registry resolves a default.
    pub model: Option<String>,
    pub temperature: f64,
}

impl Default for EmailParameters {
    fn default() -> Self {
        Self {
            sales_info: SalesInfo::default(),
            customer_info: CustomerInfo::default(),
            email_context: String::new(),
            tone: Tone::default(),
            length: Length::default(),
            output_format: OutputFormat::default(),
            model: None,
            temperature: 0.7,
        }
    }
}

/// Addressable leaf text fields for [`EmailParameters::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    SalesName,
    SalesTitle,
    SalesPhone,
    SalesEmail,
    CustomerName,
    CustomerTitle,
    CustomerCompany,
    CustomerPhone,
    CustomerEmail,
    EmailContext,
}

impl EmailParameters {
    /// Starter parameters with a plausible sender/recipient pair and product
    /// context, so a fresh session can generate without filling every field.
    pub fn sample() -> Self {
        Self {
            sales_info: SalesInfo {
                name: "Alex Nguyen".into(),
                title: "Account Executive".into(),
                contact: ContactInfo {
                    phone: "+1 555 0134".into(),
                    email: "alex.nguyen@fastwork.example".into(),
                },
            },
            customer_info: CustomerInfo {
                name: "Jordan Tran".into(),
                title: "Marketing Director".into(),
                company: "ABC Corp".into(),
                contact: ContactInfo {
                    phone: "+1 555 0199".into(),
                    email: "jordan.tran@abccorp.example".into(),
                },
            },
            email_context: "Introduce the Fastwork business management suite: task \
                            management, HR, CRM and finance modules. Emphasize the \
                            efficiency gains and revenue growth for the customer's team."
                .into(),
            ..Self::default()
        }
    }

    /// Write one leaf field, leaving every sibling untouched.
    pub fn set(&mut self, field: ParamField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ParamField::SalesName => self.sales_info.name = value,
            ParamField::SalesTitle => self.sales_info.title = value,
            ParamField::SalesPhone => self.sales_info.contact.phone = value,
            ParamField::SalesEmail => self.sales_info.contact.email = value,
            ParamField::CustomerName => self.customer_info.name = value,
            ParamField::CustomerTitle => self.customer_info.title = value,
            ParamField::CustomerCompany => self.customer_info.company = value,
            ParamField::CustomerPhone => self.customer_info.contact.phone = value,
            ParamField::CustomerEmail => self.customer_info.contact.email = value,
            ParamField::EmailContext => self.email_context = value,
        }
    }

    /// Set the sampling temperature, clamped to the valid `[0, 1]` range.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(0.0, 1.0);
    }
}
