//! Catalog browsing commands.

use std::time::Duration;
use tokio::runtime::Runtime;

use crate::model::{IndexGroup, MediaItem};
use crate::subsonic::SubsonicClient;

/// Check that the server answers
pub fn cmd_ping(rt: &Runtime, client: &SubsonicClient) -> anyhow::Result<()> {
    let status = rt.block_on(client.ping())?;
    println!("Status:  {}", status.status);
    println!("Version: {}", status.server_version);
    if !status.xmlns.is_empty() {
        println!("Schema:  {}", status.xmlns);
    }
    Ok(())
}

pub fn cmd_license(rt: &Runtime, client: &SubsonicClient) -> anyhow::Result<()> {
    let license = rt.block_on(client.get_license())?;
    println!("Valid:   {}", if license.valid { "yes" } else { "no" });
    println!("Email:   {}", license.email);
    println!("Issued:  {}", license.issued.format("%Y-%m-%d"));
    if let Some(expires) = license.expires {
        println!("Expires: {}", expires.format("%Y-%m-%d"));
    }
    Ok(())
}

pub fn cmd_folders(rt: &Runtime, client: &SubsonicClient) -> anyhow::Result<()> {
    let folders = rt.block_on(client.get_music_folders())?;
    if folders.is_empty() {
        println!("No music folders configured.");
    }
    for folder in folders {
        println!("{:>6}  {}", folder.id, folder.name);
    }
    Ok(())
}

pub fn cmd_indexes(
    rt: &Runtime,
    client: &SubsonicClient,
    folder: Option<i64>,
    since: Option<i64>,
) -> anyhow::Result<()> {
    let groups = rt.block_on(client.get_indexes(folder, since))?;
    if groups.is_empty() && since.is_some() {
        println!("No changes since {}.", since.unwrap_or_default());
        return Ok(());
    }
    print_index(&groups);
    Ok(())
}

pub fn cmd_artists(
    rt: &Runtime,
    client: &SubsonicClient,
    folder: Option<i64>,
) -> anyhow::Result<()> {
    let groups = rt.block_on(client.get_artists(folder))?;
    print_index(&groups);
    Ok(())
}

pub fn cmd_artist(rt: &Runtime, client: &SubsonicClient, id: i64) -> anyhow::Result<()> {
    let artist = rt.block_on(client.get_artist(id))?;
    let header = format!("{} (id {})", artist.name, artist.id);
    println!("{}", header);
    println!("{}", "=".repeat(header.chars().count()));

    for album in &artist.albums {
        let songs = album
            .song_count
            .map(|n| format!("{} songs", n))
            .unwrap_or_default();
        let length = album.duration.map(format_duration).unwrap_or_default();
        println!("{:>8}  {}  {} {}", album.id, album.name, songs, length);
    }
    Ok(())
}

/// List sub-directories first, then media
pub fn cmd_browse(rt: &Runtime, client: &SubsonicClient, id: i64) -> anyhow::Result<()> {
    let listing = rt.block_on(client.get_music_directory(id))?;

    if let Some(name) = &listing.name {
        println!("{}", name);
        println!();
    }
    if !listing.children_reported {
        println!("(no children reported)");
        return Ok(());
    }
    if !listing.has_children() {
        println!("(empty)");
        return Ok(());
    }

    for dir in &listing.directories {
        println!("{:>8}  [dir] {}", dir.id, dir.title);
    }
    for item in &listing.media {
        println!("{:>8}  {}", item.id, describe_media(item));
    }
    Ok(())
}

pub fn cmd_now_playing(rt: &Runtime, client: &SubsonicClient) -> anyhow::Result<()> {
    let entries = rt.block_on(client.get_now_playing())?;
    if entries.is_empty() {
        println!("Nothing is playing.");
        return Ok(());
    }

    for entry in entries {
        let who = entry.username.as_deref().unwrap_or("?");
        let player = entry
            .player_name
            .clone()
            .unwrap_or_else(|| format!("player {}", entry.player_id));
        println!(
            "{} on {} ({} min ago): {}",
            who,
            player,
            entry.minutes_ago,
            describe_media(&entry.item)
        );
    }
    Ok(())
}

fn print_index(groups: &[IndexGroup]) {
    for group in groups {
        println!("{}", group.name);
        for artist in &group.artists {
            match artist.album_count {
                Some(count) => println!("  {:>6}  {} ({} albums)", artist.id, artist.name, count),
                None => println!("  {:>6}  {}", artist.id, artist.name),
            }
        }
    }
}

fn describe_media(item: &MediaItem) -> String {
    let mut line = match (&item.artist, item.track) {
        (Some(artist), Some(track)) => format!("{:02}. {} - {}", track, artist, item.title),
        (Some(artist), None) => format!("{} - {}", artist, item.title),
        (None, Some(track)) => format!("{:02}. {}", track, item.title),
        (None, None) => item.title.clone(),
    };
    line.push_str(&format!(
        " [{}, {}, {} kbps]",
        item.suffix,
        format_duration(item.duration),
        item.bit_rate
    ));
    if item.is_video() {
        line.push_str(" (video)");
    }
    line
}

/// Format as `m:ss`, or `h:mm:ss` past an hour
fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
