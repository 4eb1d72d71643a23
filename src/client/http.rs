use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use tracing::debug;
use uuid::Uuid;

use super::{ClientError, Draft, RecordApi};
use crate::employees::Employee;

/// Talks to the record endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRecordApi {
    client: Client,
    base_url: String,
}

impl HttpRecordApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL of a stored photo, for `<img src>`.
    pub fn image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            format!("{}/{}", self.base_url, image.trim_start_matches('/'))
        }
    }
}

fn multipart(draft: &Draft) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in draft.text_fields() {
        form = form.text(name, value.to_string());
    }
    if let Some(file) = &draft.image {
        let part = Part::bytes(file.body.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        form = form.part("image", part);
    }
    Ok(form)
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = res.text().await.unwrap_or_default();
    Err(ClientError::Service {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecordApi for HttpRecordApi {
    async fn create(&self, draft: &Draft) -> Result<(), ClientError> {
        let res = self
            .client
            .post(self.url("/post"))
            .multipart(multipart(draft)?)
            .send()
            .await?;
        check(res).await?;
        debug!("employee submitted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Employee>, ClientError> {
        let res = self.client.get(self.url("/getUsers")).send().await?;
        Ok(check(res).await?.json().await?)
    }

    async fn get(&self, id: Uuid) -> Result<Employee, ClientError> {
        let res = self
            .client
            .get(self.url(&format!("/getUser/{id}")))
            .send()
            .await?;
        Ok(check(res).await?.json().await?)
    }

    async fn update(&self, id: Uuid, draft: &Draft) -> Result<(), ClientError> {
        let res = self
            .client
            .put(self.url(&format!("/updateUser/{id}")))
            .multipart(multipart(draft)?)
            .send()
            .await?;
        check(res).await?;
        debug!(%id, "employee update sent");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let res = self
            .client
            .delete(self.url(&format!("/deleteUser/{id}")))
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}
