//! Media transfer and scrobbling commands.

use std::io::Write;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::subsonic::{MediaStream, StreamOptions, SubsonicClient};

pub fn cmd_stream(
    rt: &Runtime,
    client: &SubsonicClient,
    id: i64,
    options: &StreamOptions,
    out: &Path,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let stream = client.stream(id, options).await?;
        report_saved(out, save_stream(stream, out).await?);
        Ok(())
    })
}

pub fn cmd_download(
    rt: &Runtime,
    client: &SubsonicClient,
    id: i64,
    out: &Path,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let stream = client.download(id).await?;
        report_saved(out, save_stream(stream, out).await?);
        Ok(())
    })
}

pub fn cmd_cover_art(
    rt: &Runtime,
    client: &SubsonicClient,
    id: i64,
    size: Option<u32>,
    out: &Path,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let stream = client.get_cover_art(id, size).await?;
        report_saved(out, save_stream(stream, out).await?);
        Ok(())
    })
}

pub fn cmd_scrobble(
    rt: &Runtime,
    client: &SubsonicClient,
    id: i64,
    time: Option<i64>,
    submission: bool,
) -> anyhow::Result<()> {
    rt.block_on(client.scrobble(id, time, submission))?;
    if submission {
        println!("Scrobbled {}", id);
    } else {
        println!("Now playing {}", id);
    }
    Ok(())
}

/// Write a media stream to `out` chunk by chunk, returning the byte count.
///
/// A partially written file is removed on failure.
pub(crate) async fn save_stream(mut stream: MediaStream, out: &Path) -> anyhow::Result<u64> {
    let mut file = std::fs::File::create(out)?;
    let mut written = 0u64;

    let result: anyhow::Result<()> = async {
        while let Some(chunk) = stream.next_chunk().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        file.flush()?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        drop(file);
        let _ = std::fs::remove_file(out);
        return Err(e);
    }

    if let Some(expected) = stream.content_length {
        if expected != written {
            tracing::warn!(
                "Expected {} bytes but received {} for {:?}",
                expected,
                written,
                out
            );
        }
    }

    Ok(written)
}

fn report_saved(out: &Path, bytes: u64) {
    println!("Saved {} bytes to {}", bytes, out.display());
}
