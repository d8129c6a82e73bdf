use meet_ai::Config;
use meet_ai::audio::{ReaderCapture, SessionEnd, Transcriber};
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

fn print_usage(bin_name: &str) {
    eprintln!("Usage: {bin_name} [ws://host:port/audio] < samples.f32le");
    eprintln!("Reads mono little-endian f32 samples from stdin and streams them as 16-bit PCM.");
}

fn init_tracing(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "audio_client".to_string());
    let socket_url = args.next();

    if args.next().is_some() || matches!(socket_url.as_deref(), Some("-h") | Some("--help")) {
        print_usage(&bin_name);
        std::process::exit(2);
    }

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.json_format);

    if let Some(url) = socket_url {
        config.audio.socket_url = url;
    }

    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    let (transcriber, _controls) = Transcriber::new(&config.audio, updates_tx);

    let printer = tokio::spawn(async move {
        while let Some(update) = updates_rx.recv().await {
            match serde_json::from_str::<serde_json::Value>(&update.data) {
                Ok(message) => println!("{}", message["transcript"].as_str().unwrap_or_default()),
                Err(_) => println!("{}", update.data),
            }
        }
    });

    let device = ReaderCapture::new(tokio::io::stdin());
    // Held until the session ends on EOF or socket close.
    let (_stop_tx, stop_rx) = oneshot::channel::<()>();

    let result = transcriber.run(&device, stop_rx).await;
    drop(transcriber);
    let _ = printer.await;

    match result {
        Ok(SessionEnd::SocketClosed) => eprintln!("Transcription socket closed"),
        Ok(_) => eprintln!("Audio input finished"),
        Err(err) => {
            eprintln!("Streaming failed: {err}");
            std::process::exit(1);
        }
    }
}
