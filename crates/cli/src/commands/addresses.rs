//! Saved address commands.

use clap::{Args, Subcommand};
use farmstand_core::{Address, AddressDraft, AddressId};
use farmstand_storefront::AppError;

use super::State;

#[derive(Subcommand)]
pub enum AddressesAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressFields),
    /// Replace the fields of a saved address
    Update {
        /// Address ID
        id: AddressId,

        #[command(flatten)]
        fields: AddressFields,
    },
    /// Delete a saved address
    Remove {
        /// Address ID
        id: AddressId,
    },
    /// Make an address the default
    Default {
        /// Address ID
        id: AddressId,
    },
}

#[derive(Args)]
pub struct AddressFields {
    #[arg(long)]
    street: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    country: String,

    #[arg(long)]
    zip: String,

    /// Use for deliveries
    #[arg(long)]
    default: bool,
}

impl From<AddressFields> for AddressDraft {
    fn from(fields: AddressFields) -> Self {
        Self {
            street: fields.street,
            city: fields.city,
            state: fields.state,
            country: fields.country,
            zip_code: fields.zip,
            is_default: fields.default,
        }
    }
}

pub fn run(state: &State, action: AddressesAction) -> Result<(), AppError> {
    let book = state.addresses();
    match action {
        AddressesAction::List => {
            let addresses = book.addresses();
            for address in &addresses {
                log_address(address);
            }
            tracing::info!(count = addresses.len(), "Addresses");
        }
        AddressesAction::Add(fields) => {
            let address = book.add(fields.into())?;
            log_address(&address);
        }
        AddressesAction::Update { id, fields } => {
            let address = book.update(&id, fields.into())?;
            log_address(&address);
        }
        AddressesAction::Remove { id } => book.remove(&id)?,
        AddressesAction::Default { id } => book.set_default(&id)?,
    }
    Ok(())
}

fn log_address(address: &Address) {
    tracing::info!(
        id = %address.id,
        default = address.is_default,
        "{}",
        address.one_line()
    );
}
