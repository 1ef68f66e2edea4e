use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use structopt::StructOpt;

use sendgrid_mailer::{Attachment, LogCrateLogger, Mailer, SendMailParams};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sendgrid-send",
    about = "Send one transactional email through SendGrid."
)]
struct Opt {
    /// Config file; SENDGRID_* environment variables override it
    #[structopt(short, long)]
    config: Option<String>,

    #[structopt(short, long)]
    to: String,

    #[structopt(short, long, default_value = "")]
    name: String,

    #[structopt(short, long, default_value = "")]
    subject: String,

    #[structopt(long)]
    html: Option<String>,

    #[structopt(long)]
    template_id: Option<String>,

    /// Template data as key=value; values are parsed as JSON when possible
    #[structopt(short, long, parse(try_from_str = parse_data))]
    data: Vec<(String, serde_json::Value)>,

    #[structopt(short, long, parse(from_os_str))]
    attach: Vec<PathBuf>,

    #[structopt(long, default_value = "0")]
    asm_group: i64,

    #[structopt(long)]
    asm_display: Vec<i64>,
}

fn parse_data(s: &str) -> Result<(String, serde_json::Value), String> {
    let mut parts = s.splitn(2, '=');

    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => {
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            Ok((key.to_string(), value))
        }
        _ => Err(format!("expected key=value, got \"{}\"", s)),
    }
}

fn guess_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn read_attachment(path: &Path) -> Result<Attachment, Box<dyn std::error::Error>> {
    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("invalid attachment path: {}", path.display()))?;

    log::debug!("Attaching {} ({} bytes)", filename, data.len());

    Ok(Attachment::from_bytes(filename, guess_mime(path), &data))
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = sendgrid_mailer::load_config(opt.config.as_deref())?;
    config.logger = Some(Arc::new(LogCrateLogger));

    let mailer = Mailer::try_new(config)?;

    let attachments = opt
        .attach
        .iter()
        .map(|p| read_attachment(p))
        .collect::<Result<Vec<_>, _>>()?;

    let params = SendMailParams {
        subject: opt.subject,
        name: opt.name,
        email: opt.to,
        attachments,
        html_content: opt.html,
        template_id: opt.template_id,
        data: opt.data.into_iter().collect::<HashMap<_, _>>(),
        asm_group_id: opt.asm_group,
        asm_groups_to_display: opt.asm_display,
    };

    mailer.send_mail(&params)?;

    log::info!("Mail sent to {}", params.email);

    Ok(())
}

fn main() {
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    if let Err(e) = run(opt) {
        eprintln!("sendgrid-send: {}", e);
        std::process::exit(1);
    }
}
