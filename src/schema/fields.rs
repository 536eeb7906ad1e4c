//! Built-in field sets.
//!
//! Hosts usually author their schemas as JSON and feed them through
//! [`parse_descriptors`](super::parse_descriptors); the sets here cover the
//! onboarding flows that ship with the engine.

use super::{FieldDescriptor, Variant};

/// Provider KYC onboarding fields: store name, registered address, contact
/// details, and the Indian tax/registration identifiers with their fixed
/// lengths (PAN 10, GSTIN 15, FSSAI 14, mobile 10).
pub fn provider_kyc_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("providerStoreName", Variant::Input)
            .titled("Provider Store Name")
            .required(),
        FieldDescriptor::new("address", Variant::Input)
            .titled("Registered Address")
            .required(),
        FieldDescriptor::new("contactEmail", Variant::Input)
            .titled("Email")
            .required(),
        FieldDescriptor::new("contactMobile", Variant::Input)
            .titled("Mobile Number")
            .required()
            .max_length(10),
        FieldDescriptor::new("PAN", Variant::Input)
            .titled("PAN")
            .required()
            .max_length(10),
        FieldDescriptor::new("GSTN", Variant::Input)
            .titled("GSTIN")
            .required()
            .max_length(15),
        FieldDescriptor::new("FSSAI", Variant::Input)
            .titled("FSSAI Number")
            .required()
            .max_length(14),
    ]
}
