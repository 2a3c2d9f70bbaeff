//! Commands for browsing and adding food map locations
use crate::{
    cli::{Commands, OutputOptions},
    client::{ClientError, LocationClient},
    output::{
        self,
        rows::{GroupRow, LocationRow, LocationRowFull},
    },
};
use anyhow::{Result, anyhow};
use libfood::{
    location::{Location, NewLocation},
    search::{CategoryGroup, LocationFilter},
};
use strum::IntoEnumIterator;
use tracing::debug;

fn format_locations(locations: &[&Location], output: OutputOptions) -> Result<String> {
    match output.full {
        true => {
            let rows = locations.iter().map(|l| LocationRowFull::new(l));
            output::format_seq(rows, output.format, "locations")
        }
        false => {
            let rows = locations.iter().map(|l| LocationRow::new(l));
            output::format_seq(rows, output.format, "locations")
        }
    }
}

fn format_location(location: &Location, output: OutputOptions) -> Result<String> {
    match output.full {
        true => output::format_one(LocationRowFull::new(location), output.format),
        false => output::format_one(LocationRow::new(location), output.format),
    }
}

fn format_groups() -> Result<String> {
    let rows = CategoryGroup::iter().map(GroupRow::new);
    output::format_seq(rows, output::OutputFormat::Table, "category groups")
}

/// Handle a `foodctl` command
pub(crate) async fn handle_command(command: Commands, client: &mut LocationClient) -> Result<()> {
    match command {
        Commands::List {
            query,
            group,
            output,
        } => {
            let filter = LocationFilter::new(query.unwrap_or_default(), group);
            let locations = client.locations().await?;
            let visible = filter.apply(locations);
            debug!(?filter, total = locations.len(), shown = visible.len(), "filtered");
            println!("{}", format_locations(&visible, output)?);
            Ok(())
        }
        Commands::Show { id, output } => match client.location(id).await {
            Ok(location) => {
                println!("{}", format_location(&location, output)?);
                Ok(())
            }
            Err(ClientError::NotFound(_)) => {
                println!("Location {id} not found");
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        Commands::Add {
            name,
            description,
            latitude,
            longitude,
            category,
            icon,
            brand,
            address,
            tags,
        } => {
            let mut new = NewLocation::new(name, latitude, longitude)
                .with_category(category.unwrap_or_default());
            new.description = description;
            new.icon = icon;
            new.brand = brand;
            new.address = address;
            new.tags = tags;
            new.validate()?;
            match client.create(&new).await {
                Ok(location) => {
                    println!("Added location {} to the map", location.id);
                    Ok(())
                }
                Err(ClientError::Rejected {
                    message,
                    field: Some(field),
                }) if !field.is_empty() => Err(anyhow!("Invalid {field}: {message}")),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Groups => {
            println!("{}", format_groups()?);
            Ok(())
        }
    }
}
