use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use voicescribe::application::ports::SpeechRecognizer;
use voicescribe::application::services::{
    EncodingResolver, JobSubmitter, PollingScheduler, TempAudioStore, TranscriptionService,
};
use voicescribe::infrastructure::google::{
    GoogleCredentials, GoogleSpeechRecognizer, ServiceAccountKey, ServiceAccountTokenProvider,
};
use voicescribe::infrastructure::observability::{TracingConfig, init_tracing};
use voicescribe::infrastructure::persistence::InMemoryJobRepository;
use voicescribe::infrastructure::storage::StagingStoreFactory;
use voicescribe::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));

    let key = ServiceAccountKey::load(
        settings.google.credentials_json.as_deref(),
        settings.google.credentials_path.as_deref(),
    )
    .context("failed to load Google service-account credentials")?;
    let tokens = Arc::new(ServiceAccountTokenProvider::new(key.clone())?);
    let credentials = GoogleCredentials { key, tokens };

    let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(GoogleSpeechRecognizer::new(
        &settings.google.speech_base_url,
        Arc::clone(&credentials.tokens),
    ));

    let staging = StagingStoreFactory::create(
        &settings.storage,
        &settings.google,
        Some(&credentials),
    )?;
    let store = TempAudioStore::new(staging, settings.storage.retention());

    let submitter = JobSubmitter::new(
        Arc::clone(&recognizer),
        EncodingResolver::new(settings.recognition.unknown_encoding.into()),
        settings.recognition.defaults(),
    );
    let scheduler = PollingScheduler::new(Arc::clone(&recognizer), settings.polling.policy());

    let transcription_service = Arc::new(TranscriptionService::new(
        store,
        submitter,
        scheduler,
        Arc::new(InMemoryJobRepository::new()),
        settings.service_options(),
    ));

    let router = create_router(AppState::new(transcription_service));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!(
        %addr,
        environment = %environment,
        project_id = %credentials.project_id(),
        storage = ?settings.storage.provider,
        "Listening"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
