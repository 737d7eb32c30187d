use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{empty_string_as_none, trim_option, trim_string};
use crate::models::{Company, CompanyAddress, Contact};
use crate::utils::validation::{validate_gstin, validate_optional_pincode};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom(function = "validate_optional_pincode"))]
    pub pincode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Invalid contact email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "trim_string")]
    #[validate(custom(function = "validate_gstin"))]
    pub gst_number: String,
    #[validate(nested)]
    pub address: Option<CompanyAddressInput>,
    #[validate(nested)]
    pub contact: Option<ContactInput>,
}

/// Partial update: only the fields present are changed.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[serde(default, deserialize_with = "trim_option")]
    #[validate(length(min = 1, message = "Company name cannot be empty"))]
    pub name: Option<String>,
    pub logo: Option<String>,
    #[validate(custom(function = "validate_gstin"))]
    pub gst_number: Option<String>,
    #[validate(nested)]
    pub address: Option<CompanyAddressInput>,
    #[validate(nested)]
    pub contact: Option<ContactInput>,
}

fn apply_text(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v.trim().to_string();
    }
}

impl CompanyAddressInput {
    pub fn apply(self, address: &mut CompanyAddress) {
        apply_text(&mut address.street, self.street);
        apply_text(&mut address.city, self.city);
        apply_text(&mut address.state, self.state);
        apply_text(&mut address.pincode, self.pincode);
        if let Some(country) = self.country.filter(|c| !c.trim().is_empty()) {
            address.country = country.trim().to_string();
        }
    }
}

impl ContactInput {
    pub fn apply(self, contact: &mut Contact) {
        if let Some(email) = self.email {
            contact.email = email.to_lowercase();
        }
        apply_text(&mut contact.phone, self.phone);
    }
}

impl CreateCompanyRequest {
    pub fn into_company(self, owner_id: String) -> Company {
        let mut company = Company::new(
            owner_id,
            self.name.trim().to_string(),
            self.gst_number.trim().to_uppercase(),
        );
        apply_text(&mut company.logo, self.logo);
        if let Some(address) = self.address {
            address.apply(&mut company.address);
        }
        if let Some(contact) = self.contact {
            contact.apply(&mut company.contact);
        }
        company
    }
}

impl UpdateCompanyRequest {
    pub fn apply(self, company: &mut Company) {
        apply_text(&mut company.name, self.name);
        apply_text(&mut company.logo, self.logo);
        if let Some(gst_number) = self.gst_number {
            company.gst_number = gst_number.trim().to_uppercase();
        }
        if let Some(address) = self.address {
            address.apply(&mut company.address);
        }
        if let Some(contact) = self.contact {
            contact.apply(&mut company.contact);
        }
        company.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub gst_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    pub address: CompanyAddressResponse,
    pub contact: ContactResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            state_code: gst_core::gstin::state_code(&c.gst_number).map(str::to_string),
            id: c.id,
            name: c.name,
            logo: c.logo,
            gst_number: c.gst_number,
            address: CompanyAddressResponse {
                street: c.address.street,
                city: c.address.city,
                state: c.address.state,
                pincode: c.address.pincode,
                country: c.address.country,
            },
            contact: ContactResponse {
                email: c.contact.email,
                phone: c.contact.phone,
            },
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub company: CompanyResponse,
}
