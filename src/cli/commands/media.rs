use clap::{Arg, ArgMatches, Command};

pub const ARG_CLOUDINARY_URL: &str = "cloudinary-url";
pub const ARG_CLOUDINARY_UPLOAD_PRESET: &str = "cloudinary-upload-preset";

#[derive(Debug, Clone)]
pub struct Options {
    pub upload_url: String,
    pub upload_preset: String,
}

impl Options {
    /// Parse image host arguments. `None` leaves uploads disabled.
    ///
    /// # Errors
    /// Returns an error if the upload URL is set without a preset.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Option<Self>> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(upload_url) = get_non_empty(ARG_CLOUDINARY_URL) else {
            return Ok(None);
        };
        let Some(upload_preset) = get_non_empty(ARG_CLOUDINARY_UPLOAD_PRESET) else {
            anyhow::bail!(
                "missing required argument: --{ARG_CLOUDINARY_UPLOAD_PRESET} (required with --{ARG_CLOUDINARY_URL})"
            );
        };

        Ok(Some(Self {
            upload_url,
            upload_preset,
        }))
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CLOUDINARY_URL)
                .long(ARG_CLOUDINARY_URL)
                .help("Image host upload URL, e.g. https://api.cloudinary.com/v1_1/<cloud>/image/upload")
                .env("VEHIREG_CLOUDINARY_URL"),
        )
        .arg(
            Arg::new(ARG_CLOUDINARY_UPLOAD_PRESET)
                .long(ARG_CLOUDINARY_UPLOAD_PRESET)
                .help("Unsigned upload preset for the image host")
                .env("VEHIREG_CLOUDINARY_UPLOAD_PRESET"),
        )
}
