//! Discovery document for `GET /cds-services`.

use crate::constants::{
    PATIENT_SERVICE_DESCRIPTION, PATIENT_SERVICE_ID, PATIENT_SERVICE_TITLE, PATIENT_VIEW_HOOK,
};
use api_shared::{ServiceDescriptor, Services};

/// Descriptor of the single `patient-view` service.
pub fn patient_view_descriptor() -> ServiceDescriptor {
    ServiceDescriptor {
        hook: PATIENT_VIEW_HOOK.into(),
        title: PATIENT_SERVICE_TITLE.into(),
        description: PATIENT_SERVICE_DESCRIPTION.into(),
        id: PATIENT_SERVICE_ID.into(),
    }
}

/// The full discovery body. Identical on every call.
pub fn services() -> Services {
    Services {
        services: vec![patient_view_descriptor()],
    }
}
