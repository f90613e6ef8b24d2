use crate::model::{
    auth::ExternalIdentity,
    id::LibraryId,
    library::OpeningHours,
};
use derive_new::new;

#[derive(Debug, new)]
pub struct RegisterLibrary {
    pub identity: ExternalIdentity,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: Vec<OpeningHours>,
}

#[derive(Debug, Default)]
pub struct UpdateLibrary {
    pub library_id: LibraryId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, new)]
pub struct ReplaceOpeningHours {
    pub library_id: LibraryId,
    pub opening_hours: Vec<OpeningHours>,
}

#[derive(Debug, new)]
pub struct RejectLibrary {
    pub library_id: LibraryId,
    pub reason: Option<String>,
}
