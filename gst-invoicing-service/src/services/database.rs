use crate::models::{BankProfile, Company, Invoice};
use crate::services::invoice_number::{InvoiceNumberLedger, InvoiceWriter};
use async_trait::async_trait;
use futures::TryStreamExt;
use gst_core::invoice_number::sequential_pattern;
use mongodb::{
    bson::{doc, to_document, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

/// MongoDB duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

fn db_error(context: &str, e: mongodb::error::Error) -> AppError {
    tracing::error!("{}: {}", context, e);
    AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
}

pub fn is_duplicate_key_error(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for gst-invoicing-service");

        let invoice_indexes = [
            IndexModel::builder()
                .keys(doc! { "invoice_number": 1, "owner_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("invoice_number_owner_idx".to_string())
                        .unique(true)
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "invoice_date": -1 })
                .options(
                    IndexOptions::builder()
                        .name("owner_invoice_date_idx".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "status": 1 })
                .options(
                    IndexOptions::builder()
                        .name("owner_status_idx".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "due_date": 1 })
                .options(
                    IndexOptions::builder()
                        .name("owner_due_date_idx".to_string())
                        .build(),
                )
                .build(),
        ];

        for index in invoice_indexes {
            self.invoices()
                .create_index(index, None)
                .await
                .map_err(|e| db_error("Failed to create invoice index", e))?;
        }

        // One company and one bank profile per owner
        let owner_unique = |name: &str| {
            IndexModel::builder()
                .keys(doc! { "owner_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(true)
                        .build(),
                )
                .build()
        };

        self.companies()
            .create_index(owner_unique("company_owner_idx"), None)
            .await
            .map_err(|e| db_error("Failed to create company owner index", e))?;

        self.banks()
            .create_index(owner_unique("bank_owner_idx"), None)
            .await
            .map_err(|e| db_error("Failed to create bank owner index", e))?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| db_error("MongoDB health check failed", e))?;
        Ok(())
    }

    pub fn companies(&self) -> Collection<Company> {
        self.db.collection("companies")
    }

    pub fn banks(&self) -> Collection<BankProfile> {
        self.db.collection("banks")
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    // Companies

    pub async fn find_company(&self, owner_id: &str) -> Result<Option<Company>, AppError> {
        self.companies()
            .find_one(doc! { "owner_id": owner_id }, None)
            .await
            .map_err(|e| db_error("Failed to find company", e))
    }

    pub async fn find_company_by_id(&self, company_id: &str) -> Result<Option<Company>, AppError> {
        self.companies()
            .find_one(doc! { "_id": company_id }, None)
            .await
            .map_err(|e| db_error("Failed to find company by id", e))
    }

    pub async fn insert_company(&self, company: &Company) -> Result<(), AppError> {
        match self.companies().insert_one(company, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key_error(&e) => Err(AppError::Conflict(anyhow::anyhow!(
                "Company already exists. Use update instead."
            ))),
            Err(e) => Err(db_error("Failed to insert company", e)),
        }
    }

    pub async fn replace_company(&self, company: &Company) -> Result<(), AppError> {
        self.companies()
            .replace_one(
                doc! { "_id": company.id.as_str(), "owner_id": company.owner_id.as_str() },
                company,
                None,
            )
            .await
            .map_err(|e| db_error("Failed to update company", e))?;
        Ok(())
    }

    // Bank profiles

    pub async fn find_bank(&self, owner_id: &str) -> Result<Option<BankProfile>, AppError> {
        self.banks()
            .find_one(doc! { "owner_id": owner_id }, None)
            .await
            .map_err(|e| db_error("Failed to find bank profile", e))
    }

    /// Save the owner's bank details and return the stored profile. The first writer's
    /// `_id` and `created_at` are kept when two first-time saves race.
    pub async fn upsert_bank(&self, bank: &BankProfile) -> Result<BankProfile, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        self.banks()
            .find_one_and_update(
                doc! { "owner_id": bank.owner_id.as_str() },
                bank_update(bank)?,
                options,
            )
            .await
            .map_err(|e| db_error("Failed to save bank profile", e))?
            .ok_or_else(|| {
                AppError::DatabaseError(anyhow::anyhow!("Bank profile missing after upsert"))
            })
    }

    // Invoices

    /// A duplicate invoice number surfaces as `Conflict` so the caller can retry.
    pub async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        match self.invoices().insert_one(invoice, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key_error(&e) => {
                tracing::warn!(
                    invoice_number = %invoice.invoice_number,
                    "Duplicate invoice number on insert"
                );
                Err(AppError::Conflict(anyhow::anyhow!(
                    "Invoice number already exists. Please try again."
                )))
            }
            Err(e) => Err(db_error("Failed to insert invoice", e)),
        }
    }

    pub async fn find_invoice(
        &self,
        owner_id: &str,
        invoice_id: &str,
    ) -> Result<Option<Invoice>, AppError> {
        self.invoices()
            .find_one(doc! { "_id": invoice_id, "owner_id": owner_id }, None)
            .await
            .map_err(|e| db_error("Failed to find invoice", e))
    }

    /// Returns `false` when no invoice matched.
    pub async fn replace_invoice(&self, invoice: &Invoice) -> Result<bool, AppError> {
        let result = self
            .invoices()
            .replace_one(
                doc! { "_id": invoice.id.as_str(), "owner_id": invoice.owner_id.as_str() },
                invoice,
                None,
            )
            .await
            .map_err(|e| db_error("Failed to update invoice", e))?;
        Ok(result.matched_count > 0)
    }

    /// Returns `false` when no invoice matched.
    pub async fn delete_invoice(&self, owner_id: &str, invoice_id: &str) -> Result<bool, AppError> {
        let result = self
            .invoices()
            .delete_one(doc! { "_id": invoice_id, "owner_id": owner_id }, None)
            .await
            .map_err(|e| db_error("Failed to delete invoice", e))?;
        Ok(result.deleted_count > 0)
    }

    pub async fn list_invoices(
        &self,
        filter: Document,
        sort: Document,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Invoice>, AppError> {
        let find_options = FindOptions::builder()
            .sort(sort)
            .skip(skip)
            .limit(limit)
            .build();

        let cursor = self
            .invoices()
            .find(filter, find_options)
            .await
            .map_err(|e| db_error("Failed to list invoices", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| db_error("Failed to collect invoices", e))
    }

    pub async fn count_invoices(&self, filter: Document) -> Result<u64, AppError> {
        self.invoices()
            .count_documents(filter, None)
            .await
            .map_err(|e| db_error("Failed to count invoices", e))
    }

    pub async fn owner_invoices(&self, owner_id: &str) -> Result<Vec<Invoice>, AppError> {
        self.list_invoices(
            doc! { "owner_id": owner_id },
            doc! { "invoice_date": -1 },
            0,
            0,
        )
        .await
    }
}

fn bank_update(bank: &BankProfile) -> Result<Document, AppError> {
    let mut fields = to_document(bank)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode bank: {}", e)))?;
    let id = fields.remove("_id").unwrap_or(Bson::Null);
    let created_at = fields.remove("created_at").unwrap_or(Bson::Null);
    Ok(doc! {
        "$set": fields,
        "$setOnInsert": { "_id": id, "created_at": created_at },
    })
}

#[async_trait]
impl InvoiceWriter for MongoDb {
    async fn insert(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.insert_invoice(invoice).await
    }
}

#[async_trait]
impl InvoiceNumberLedger for MongoDb {
    async fn sequential_numbers(
        &self,
        owner_id: &str,
        company_id: &str,
        year: i32,
    ) -> Result<Vec<String>, AppError> {
        let filter = doc! {
            "$or": [{ "owner_id": owner_id }, { "company_id": company_id }],
            "invoice_number": { "$regex": sequential_pattern(year) },
        };

        let values = self
            .invoices()
            .distinct("invoice_number", filter, None)
            .await
            .map_err(|e| db_error("Failed to scan invoice numbers", e))?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(number) => Some(number),
                _ => None,
            })
            .collect())
    }

    async fn number_exists(&self, owner_id: &str, invoice_number: &str) -> Result<bool, AppError> {
        let count = self
            .invoices()
            .count_documents(
                doc! { "owner_id": owner_id, "invoice_number": invoice_number },
                None,
            )
            .await
            .map_err(|e| db_error("Failed to look up invoice number", e))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_update_only_sets_identity_on_insert() {
        let bank = BankProfile::new("owner-1".to_string());

        let update = bank_update(&bank).unwrap();

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert_eq!(on_insert.get_str("_id").unwrap(), bank.id);
        assert!(on_insert.get_datetime("created_at").is_ok());

        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key("_id"));
        assert!(!set.contains_key("created_at"));
        assert_eq!(set.get_str("owner_id").unwrap(), "owner-1");
        assert!(set.get_datetime("updated_at").is_ok());
    }
}
