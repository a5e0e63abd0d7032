use std::sync::Arc;

use anyhow::Context as _;
use revoice_config::Config;
use revoice_storage::{ObjectStore, PublishTarget, Publisher, S3Store};
use serde_json::Value;
use tracing::Instrument as _;

use crate::{
    encode::{WAV_EXTENSION, encode_wav},
    envelope::Job,
    error::{PipelineError, Result},
    fetch::Fetcher,
    invoke::ModelInvoker,
    model::{AudioModel, http::HttpModel},
    normalize::normalize,
    notify::{CompletionEvent, Notifier},
    outcome::PipelineOutcome,
    types::Task,
    validate::validate,
};

/// Runs jobs from envelope to published audio
///
/// Jobs share nothing but the storage backend, so one pipeline can serve
/// any number of concurrent jobs.
pub struct Pipeline {
    fetcher: Fetcher,
    invoker: ModelInvoker,
    publisher: Publisher,
    notifier: Notifier,
    inpaint_key_prefix: String,
    tts_key_prefix: String,
}

impl Pipeline {
    /// Parse an event envelope and run it
    pub async fn handle_event(&self, event: Value) -> PipelineOutcome {
        match Job::from_event(event) {
            Ok(job) => self.run(job).await,
            Err(err) => {
                let err = PipelineError::from(err);
                tracing::error!(kind = %err.kind(), "rejected event: {err}");
                err.into()
            }
        }
    }

    /// Run one job to a terminal outcome
    pub async fn run(&self, job: Job) -> PipelineOutcome {
        let span = tracing::info_span!("job", id = %job.id, task = %job.request.task());

        async move {
            match self.execute(&job).await {
                Ok(audio_url) => {
                    tracing::info!(audio_url = %audio_url, "job succeeded");
                    PipelineOutcome::Success {
                        audio_url,
                        echo: job.echo,
                    }
                }
                Err(err) => {
                    tracing::error!(kind = %err.kind(), "job failed: {err}");
                    err.into()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, job: &Job) -> Result<String> {
        let request = &job.request;

        validate(request, &job.options)?;

        // Removed when this scope ends, whichever step fails
        let source = self.fetcher.fetch(request.source_url()).await?;

        let output = self.invoker.invoke(request, source.path()).await?;
        let audio = normalize(&output)?;

        let wav = tokio::task::spawn_blocking(move || encode_wav(&audio))
            .await
            .context("audio encoder task failed")??;

        let prefix = job.options.object_key_prefix.as_deref().unwrap_or(match request.task() {
            Task::Inpaint => self.inpaint_key_prefix.as_str(),
            Task::Tts => self.tts_key_prefix.as_str(),
        });

        let published = self
            .publisher
            .publish(
                wav,
                PublishTarget {
                    bucket: job.options.bucket_name.as_deref(),
                    prefix,
                    extension: WAV_EXTENSION,
                },
            )
            .await?;

        if request.task() == Task::Tts {
            self.notify(job, &published.url).await;
        }

        source.release();

        Ok(published.url)
    }

    /// Post the completion event; failures are logged and dropped
    async fn notify(&self, job: &Job, audio_url: &str) {
        let Some(url) = self.notifier.target(job.options.webhook_url.as_deref()) else {
            return;
        };

        let event = CompletionEvent {
            userid: job.options.userid.as_deref(),
            audio_url,
        };

        if let Err(err) = self.notifier.notify(&url, &event).await {
            tracing::warn!("webhook notification failed: {err}");
        }
    }
}

/// Builder for constructing the pipeline from configuration
///
/// The model and storage backends default to the HTTP model and S3.
pub struct PipelineBuilder<'a> {
    config: &'a Config,
    model: Option<Arc<dyn AudioModel>>,
    store: Option<Arc<dyn ObjectStore>>,
}

impl<'a> PipelineBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self {
            config,
            model: None,
            store: None,
        }
    }

    #[must_use]
    pub fn model(mut self, model: Arc<dyn AudioModel>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> anyhow::Result<Pipeline> {
        let config = self.config;

        let model = match self.model {
            Some(model) => model,
            None => Arc::new(HttpModel::new(&config.model).context("failed to initialize model backend")?),
        };

        let store = match self.store {
            Some(store) => store,
            None => Arc::new(
                S3Store::from_config(&config.storage)
                    .await
                    .context("invalid storage.region")?,
            ),
        };

        tracing::debug!(model = model.name(), bucket = %config.storage.default_bucket, "initializing pipeline");

        let publisher = Publisher::new(store, config.storage.default_bucket.clone())
            .context("invalid storage.default_bucket")?;

        Ok(Pipeline {
            fetcher: Fetcher::new(&config.fetch).context("failed to build download client")?,
            invoker: ModelInvoker::new(model),
            publisher,
            notifier: Notifier::new(&config.notify).context("failed to build webhook client")?,
            inpaint_key_prefix: config.jobs.inpaint_key_prefix.clone(),
            tts_key_prefix: config.jobs.tts_key_prefix.clone(),
        })
    }
}
