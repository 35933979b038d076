use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::document::{Document, DocumentData, DocumentId, DocumentList};
use crate::error::StoreError;
use crate::query::{Bounds, Query};

/// Error body returned by the REST API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    error_type: String,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    #[serde(rename = "$id")]
    id: String,
}

fn documents_url(endpoint: &str, database_id: &str, collection: &str) -> String {
    format!(
        "{}/databases/{}/collections/{}/documents",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(database_id),
        urlencoding::encode(collection)
    )
}

fn document_url(endpoint: &str, database_id: &str, collection: &str, document_id: &str) -> String {
    format!(
        "{}/{}",
        documents_url(endpoint, database_id, collection),
        urlencoding::encode(document_id)
    )
}

/// Map a non-2xx response onto a typed error
async fn check_response(response: Response, collection: &str, document_id: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let message = body
        .as_ref()
        .map(|b| if b.error_type.is_empty() { b.message.clone() } else { format!("{} ({})", b.message, b.error_type) })
        .unwrap_or(text);

    debug!("Store request failed: {} {}", status, message);

    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound {
            collection: collection.to_string(),
            id: document_id.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::CONFLICT => StoreError::Conflict {
            collection: collection.to_string(),
            id: document_id.to_string(),
        },
        _ => StoreError::Server {
            status: status.as_u16(),
            message,
        },
    })
}

pub async fn list_documents(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    queries: &[Query],
) -> Result<DocumentList, StoreError> {
    let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_query_string())).collect();
    let response = client
        .get(documents_url(endpoint, database_id, collection))
        .query(&params)
        .send()
        .await?;

    let response = check_response(response, collection, "").await?;
    Ok(response.json().await?)
}

pub async fn get_document(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &str,
) -> Result<Document, StoreError> {
    let response = client
        .get(document_url(endpoint, database_id, collection, document_id))
        .send()
        .await?;

    let response = check_response(response, collection, document_id).await?;
    Ok(response.json().await?)
}

pub async fn create_document(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &DocumentId,
    data: &DocumentData,
) -> Result<Document, StoreError> {
    let body = json!({
        "documentId": document_id.as_str(),
        "data": data,
    });
    let response = client
        .post(documents_url(endpoint, database_id, collection))
        .json(&body)
        .send()
        .await?;

    let response = check_response(response, collection, document_id.as_str()).await?;
    Ok(response.json().await?)
}

pub async fn update_document(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &str,
    data: &DocumentData,
) -> Result<Document, StoreError> {
    let response = client
        .patch(document_url(endpoint, database_id, collection, document_id))
        .json(&json!({ "data": data }))
        .send()
        .await?;

    let response = check_response(response, collection, document_id).await?;
    Ok(response.json().await?)
}

pub async fn delete_document(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &str,
) -> Result<(), StoreError> {
    let response = client
        .delete(document_url(endpoint, database_id, collection, document_id))
        .send()
        .await?;

    check_response(response, collection, document_id).await?;
    Ok(())
}

/// Server-side increment (`delta > 0`) or decrement (`delta < 0`)
pub async fn increment_field(
    client: &Client,
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &str,
    field: &str,
    delta: i64,
    bounds: Bounds,
) -> Result<Document, StoreError> {
    let (action, body) = if delta >= 0 {
        let mut body = json!({ "value": delta });
        if let Some(max) = bounds.max {
            body["max"] = Value::from(max);
        }
        ("increment", body)
    } else {
        let mut body = json!({ "value": -delta });
        if let Some(min) = bounds.min {
            body["min"] = Value::from(min);
        }
        ("decrement", body)
    };

    let url = format!(
        "{}/{}/{}",
        document_url(endpoint, database_id, collection, document_id),
        urlencoding::encode(field),
        action
    );
    let response = client.patch(url).json(&body).send().await?;

    match check_response(response, collection, document_id).await {
        Ok(response) => Ok(response.json().await?),
        // With bounds set, a 400 on a well-formed request means the bound was hit
        Err(StoreError::Server { status: 400, message }) if bounds != Bounds::NONE => {
            warn!("Bounded {} of {}.{} rejected: {}", action, document_id, field, message);
            Err(StoreError::BoundExceeded {
                id: document_id.to_string(),
                field: field.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

/// Id of the user owning the session, `None` when the session is not valid
pub async fn get_account_id(client: &Client, endpoint: &str) -> Result<Option<String>, StoreError> {
    let response = client
        .get(format!("{}/account", endpoint.trim_end_matches('/')))
        .send()
        .await?;

    match check_response(response, "account", "current").await {
        Ok(response) => {
            let account: AccountBody = response.json().await?;
            Ok(Some(account.id))
        }
        Err(StoreError::Unauthorized(message)) => {
            debug!("No authenticated account: {}", message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
