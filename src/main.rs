use clap::{Parser, Subcommand};
use exifedit::{EditorOptions, ExifEditor, Orientation, datetime};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exifedit")]
#[command(about = "Read and write image metadata through exiftool")]
#[command(long_about = "\
Read and write image metadata through exiftool

Every command shells out to the exiftool utility, which must be installed
(https://exiftool.org). Files are modified in place unless --backup is
given, in which case exiftool leaves a <file>_original copy next to the
image.

Examples:

  exifedit tags photo.jpg
  exifedit get photo.jpg Artist
  exifedit set photo.jpg Artist='Jane Doe' Copyright=CC0
  exifedit add-keywords photo.jpg landscape iceland
  exifedit rotate-cw photo.jpg --num 2
  exifedit taken photo.jpg '2018:07:01 14:30:05'")]
#[command(version)]
struct Cli {
    /// Path to the exiftool binary (default: search PATH)
    #[arg(long, global = true, value_name = "PATH")]
    exiftool: Option<PathBuf>,

    /// Keep a <file>_original backup on every write
    #[arg(long, global = true)]
    backup: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every tag on the image
    Tags {
        image: PathBuf,
        /// Emit JSON instead of aligned text
        #[arg(long)]
        json: bool,
        /// Skip tags whose value is empty
        #[arg(long)]
        skip_empty: bool,
    },
    /// Print one tag; prints nothing if the tag is absent
    Get { image: PathBuf, tag: String },
    /// Set one or more TAG=VALUE pairs in a single invocation
    Set {
        image: PathBuf,
        #[arg(required = true, value_name = "TAG=VALUE", value_parser = parse_assignment)]
        tags: Vec<(String, String)>,
    },
    /// List keywords, one per line
    Keywords { image: PathBuf },
    /// Replace the keyword list
    SetKeywords {
        image: PathBuf,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Append keywords, preserving existing ones
    AddKeywords {
        image: PathBuf,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Remove keywords; ones the image does not carry are ignored
    RemoveKeywords {
        image: PathBuf,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Remove every keyword
    ClearKeywords { image: PathBuf },
    /// Rotate clockwise in 90 degree steps
    RotateCw {
        image: PathBuf,
        #[arg(long, default_value_t = 1)]
        num: u32,
    },
    /// Rotate counter-clockwise in 90 degree steps
    RotateCcw {
        image: PathBuf,
        #[arg(long, default_value_t = 1)]
        num: u32,
    },
    /// Flip the image left to right
    MirrorHorizontal { image: PathBuf },
    /// Flip the image top to bottom
    MirrorVertical { image: PathBuf },
    /// Print or set the capture datetime (DateTimeOriginal)
    Taken {
        image: PathBuf,
        /// `YYYY:MM:DD[ HH:MM:SS]`; prints the current value when omitted
        when: Option<String>,
    },
    /// Set the modification date tag (FileModifyDate), defaulting to now
    Touch {
        image: PathBuf,
        /// `YYYY:MM:DD[ HH:MM:SS]`
        when: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let editor = match &cli.exiftool {
        Some(program) => ExifEditor::with_program(program.clone())?,
        None => ExifEditor::new()?,
    }
    .options(EditorOptions {
        keep_backup: cli.backup,
        extra_args: Vec::new(),
    });

    match cli.command {
        Command::Tags {
            image,
            json,
            skip_empty,
        } => {
            let mut tags = editor.get_all_tags(&image)?;
            if skip_empty {
                tags.retain(|_, value| !value.is_empty());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&tags)?);
            } else {
                let width = tags.keys().map(String::len).max().unwrap_or(0);
                for (name, value) in &tags {
                    println!("{name:width$}  {value}");
                }
            }
        }
        Command::Get { image, tag } => {
            if let Some(value) = editor.get_tag(&image, &tag)? {
                println!("{value}");
            }
        }
        Command::Set { image, tags } => {
            let pairs: Vec<(&str, &str)> = tags
                .iter()
                .map(|(tag, value)| (tag.as_str(), value.as_str()))
                .collect();
            editor.set_tags(&image, &pairs)?;
        }
        Command::Keywords { image } => {
            for keyword in editor.get_keywords(&image)? {
                println!("{keyword}");
            }
        }
        Command::SetKeywords { image, keywords } => {
            editor.set_keywords(&image, &as_strs(&keywords))?;
        }
        Command::AddKeywords { image, keywords } => {
            editor.add_keywords(&image, &as_strs(&keywords))?;
        }
        Command::RemoveKeywords { image, keywords } => {
            editor.remove_keywords(&image, &as_strs(&keywords))?;
        }
        Command::ClearKeywords { image } => editor.clear_keywords(&image)?,
        Command::RotateCw { image, num } => {
            print_orientation(editor.rotate_cw(&image, num)?);
        }
        Command::RotateCcw { image, num } => {
            print_orientation(editor.rotate_ccw(&image, num)?);
        }
        Command::MirrorHorizontal { image } => {
            print_orientation(editor.mirror_horizontally(&image)?);
        }
        Command::MirrorVertical { image } => {
            print_orientation(editor.mirror_vertically(&image)?);
        }
        Command::Taken { image, when } => match when {
            Some(text) => {
                editor.set_original_date_time(&image, datetime::parse_lenient(&text)?)?;
            }
            None => {
                if let Some(taken) = editor.get_original_date_time(&image)? {
                    println!("{}", datetime::format(&taken));
                }
            }
        },
        Command::Touch { image, when } => match when {
            Some(text) => {
                editor.set_modification_date_time(&image, datetime::parse_lenient(&text)?)?;
            }
            None => editor.touch(&image)?,
        },
    }

    Ok(())
}

fn print_orientation(orientation: Orientation) {
    println!("Orientation: {}", orientation.code());
}

fn as_strs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}

fn parse_assignment(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected TAG=VALUE, got `{text}`"))
}
