//! Common test utilities for the lab-history command tests

use history_lib::{FileStorage, Session};
use lab_history::{commands, Command, ExamInfoProvider, Settings};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;

#[allow(unused_imports)]
pub use history_lib::test_utils::csv_upload;

/// Answers every lookup with a fixed text, recording nothing
#[allow(dead_code)]
pub struct FixedExamInfo(pub &'static str);

impl ExamInfoProvider for FixedExamInfo {
    fn lookup(&self, exam_name: &str) -> String {
        format!("{}: {exam_name}", self.0)
    }
}

#[allow(dead_code)]
pub fn settings_for(data_dir: &Path) -> Settings {
    Settings {
        data_dir: data_dir.to_path_buf(),
        api_key: None,
        model: "gemini-test".to_string(),
    }
}

/// Run one command in a fresh session over `data_dir`, as the binary does,
/// returning the captured output
#[allow(dead_code)]
pub fn run_command(data_dir: &Path, command: Command) -> anyhow::Result<String> {
    let storage = FileStorage::open(data_dir)?;
    let mut session = Session::start(storage);
    let mut out = Vec::new();
    commands::run(
        &command,
        &mut session,
        &settings_for(data_dir),
        &FixedExamInfo("info"),
        &mut out,
    )?;
    Ok(String::from_utf8(out)?)
}

/// Serve exactly one HTTP request on a local port with the given status and
/// JSON body. The handle yields the raw request that was received.
#[allow(dead_code)]
pub fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });

    (base_url, handle)
}

#[allow(dead_code)]
fn read_request(stream: &mut impl Read) -> String {
    let mut received = Vec::new();
    let mut buffer = [0u8; 4096];

    loop {
        let read = stream.read(&mut buffer).unwrap();
        if read == 0 {
            break;
        }
        received.extend_from_slice(&buffer[..read]);

        let text = String::from_utf8_lossy(&received);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if received.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&received).to_string()
}

/// Base URL of a local port nothing listens on
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{address}")
}
