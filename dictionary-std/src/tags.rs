//! Constant declarations for the DICOM attributes consulted by this crate
//! and its dependents.
//!
//! Each constant maps a well-known attribute alias to its `(group, element)`
//! tag, so that call sites can write `tags::PATIENT_NAME` instead of a raw
//! `Tag(0x0010, 0x0010)`. [`ENTRIES`] is the backing table consulted by
//! [`crate::data_element::StandardDataDictionary`] for name/tag lookups.

use dicom_core::dictionary::{DataDictionaryEntryRef, TagRange, VirtualVr};
use dicom_core::header::Tag;
use dicom_core::VR;

macro_rules! declare_tags {
    ($( $(#[$doc:meta])* $name:ident, $alias:literal, $group:expr, $elem:expr, $vr:expr; )*) => {
        $(
            $(#[$doc])*
            pub const $name: Tag = Tag($group, $elem);
        )*

        /// The full set of dictionary entries declared in this module,
        /// indexed by [`crate::data_element::StandardDataDictionaryRegistry`].
        pub static ENTRIES: &[DataDictionaryEntryRef<'static>] = &[
            $(
                DataDictionaryEntryRef {
                    tag: TagRange::Single($name),
                    alias: $alias,
                    vr: $vr,
                },
            )*
        ];
    };
}

declare_tags! {
    // DIMSE command group (0000,eeee)
    COMMAND_GROUP_LENGTH, "CommandGroupLength", 0x0000, 0x0000, VirtualVr::Exact(VR::UL);
    AFFECTED_SOP_CLASS_UID, "AffectedSOPClassUID", 0x0000, 0x0002, VirtualVr::Exact(VR::UI);
    REQUESTED_SOP_CLASS_UID, "RequestedSOPClassUID", 0x0000, 0x0003, VirtualVr::Exact(VR::UI);
    COMMAND_FIELD, "CommandField", 0x0000, 0x0100, VirtualVr::Exact(VR::US);
    MESSAGE_ID, "MessageID", 0x0000, 0x0110, VirtualVr::Exact(VR::US);
    MESSAGE_ID_BEING_RESPONDED_TO, "MessageIDBeingRespondedTo", 0x0000, 0x0120, VirtualVr::Exact(VR::US);
    MOVE_DESTINATION, "MoveDestination", 0x0000, 0x0600, VirtualVr::Exact(VR::AE);
    PRIORITY, "Priority", 0x0000, 0x0700, VirtualVr::Exact(VR::US);
    COMMAND_DATA_SET_TYPE, "CommandDataSetType", 0x0000, 0x0800, VirtualVr::Exact(VR::US);
    STATUS, "Status", 0x0000, 0x0900, VirtualVr::Exact(VR::US);
    AFFECTED_SOP_INSTANCE_UID, "AffectedSOPInstanceUID", 0x0000, 0x1000, VirtualVr::Exact(VR::UI);
    REQUESTED_SOP_INSTANCE_UID, "RequestedSOPInstanceUID", 0x0000, 0x1001, VirtualVr::Exact(VR::UI);
    EVENT_TYPE_ID, "EventTypeID", 0x0000, 0x1002, VirtualVr::Exact(VR::US);
    ATTRIBUTE_IDENTIFIER_LIST, "AttributeIdentifierList", 0x0000, 0x1005, VirtualVr::Exact(VR::AT);
    ACTION_TYPE_ID, "ActionTypeID", 0x0000, 0x1008, VirtualVr::Exact(VR::US);
    NUMBER_OF_REMAINING_SUBOPERATIONS, "NumberOfRemainingSuboperations", 0x0000, 0x1020, VirtualVr::Exact(VR::US);
    NUMBER_OF_COMPLETED_SUBOPERATIONS, "NumberOfCompletedSuboperations", 0x0000, 0x1021, VirtualVr::Exact(VR::US);
    NUMBER_OF_FAILED_SUBOPERATIONS, "NumberOfFailedSuboperations", 0x0000, 0x1022, VirtualVr::Exact(VR::US);
    NUMBER_OF_WARNING_SUBOPERATIONS, "NumberOfWarningSuboperations", 0x0000, 0x1023, VirtualVr::Exact(VR::US);
    MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE, "MoveOriginatorApplicationEntityTitle", 0x0000, 0x1030, VirtualVr::Exact(VR::AE);
    MOVE_ORIGINATOR_MESSAGE_ID, "MoveOriginatorMessageID", 0x0000, 0x1031, VirtualVr::Exact(VR::US);

    // File meta group (0002,eeee)
    FILE_META_INFORMATION_GROUP_LENGTH, "FileMetaInformationGroupLength", 0x0002, 0x0000, VirtualVr::Exact(VR::UL);
    MEDIA_STORAGE_SOP_CLASS_UID, "MediaStorageSOPClassUID", 0x0002, 0x0002, VirtualVr::Exact(VR::UI);
    MEDIA_STORAGE_SOP_INSTANCE_UID, "MediaStorageSOPInstanceUID", 0x0002, 0x0003, VirtualVr::Exact(VR::UI);
    TRANSFER_SYNTAX_UID, "TransferSyntaxUID", 0x0002, 0x0010, VirtualVr::Exact(VR::UI);
    IMPLEMENTATION_CLASS_UID, "ImplementationClassUID", 0x0002, 0x0012, VirtualVr::Exact(VR::UI);
    IMPLEMENTATION_VERSION_NAME, "ImplementationVersionName", 0x0002, 0x0013, VirtualVr::Exact(VR::SH);
    SOURCE_APPLICATION_ENTITY_TITLE, "SourceApplicationEntityTitle", 0x0002, 0x0016, VirtualVr::Exact(VR::AE);
    SENDING_APPLICATION_ENTITY_TITLE, "SendingApplicationEntityTitle", 0x0002, 0x0017, VirtualVr::Exact(VR::AE);
    RECEIVING_APPLICATION_ENTITY_TITLE, "ReceivingApplicationEntityTitle", 0x0002, 0x0018, VirtualVr::Exact(VR::AE);

    // Directory / DICOMDIR group (0004,eeee)
    DIRECTORY_RECORD_SEQUENCE, "DirectoryRecordSequence", 0x0004, 0x1220, VirtualVr::Exact(VR::SQ);
    PRIVATE_INFORMATION_CREATOR_UID, "PrivateInformationCreatorUID", 0x0004, 0x1401, VirtualVr::Exact(VR::UI);
    REFERENCED_FILE_ID, "ReferencedFileID", 0x0004, 0x1500, VirtualVr::Exact(VR::CS);

    // Identification group (0008,eeee)
    SOP_CLASS_UID, "SOPClassUID", 0x0008, 0x0016, VirtualVr::Exact(VR::UI);
    SOP_INSTANCE_UID, "SOPInstanceUID", 0x0008, 0x0018, VirtualVr::Exact(VR::UI);
    STUDY_DATE, "StudyDate", 0x0008, 0x0020, VirtualVr::Exact(VR::DA);
    SERIES_DATE, "SeriesDate", 0x0008, 0x0021, VirtualVr::Exact(VR::DA);
    CONTENT_DATE, "ContentDate", 0x0008, 0x0023, VirtualVr::Exact(VR::DA);
    STUDY_TIME, "StudyTime", 0x0008, 0x0030, VirtualVr::Exact(VR::TM);
    ACCESSION_NUMBER, "AccessionNumber", 0x0008, 0x0050, VirtualVr::Exact(VR::SH);
    QUERY_RETRIEVE_LEVEL, "QueryRetrieveLevel", 0x0008, 0x0052, VirtualVr::Exact(VR::CS);
    INSTANCE_AVAILABILITY, "InstanceAvailability", 0x0008, 0x0056, VirtualVr::Exact(VR::CS);
    MODALITY, "Modality", 0x0008, 0x0060, VirtualVr::Exact(VR::CS);
    MODALITIES_IN_STUDY, "ModalitiesInStudy", 0x0008, 0x0061, VirtualVr::Exact(VR::CS);
    TIMEZONE_OFFSET_FROM_UTC, "TimezoneOffsetFromUTC", 0x0008, 0x0201, VirtualVr::Exact(VR::SH);
    CODE_VALUE, "CodeValue", 0x0008, 0x0100, VirtualVr::Exact(VR::SH);
    CODING_SCHEME_DESIGNATOR, "CodingSchemeDesignator", 0x0008, 0x0102, VirtualVr::Exact(VR::SH);
    CODE_MEANING, "CodeMeaning", 0x0008, 0x0104, VirtualVr::Exact(VR::LO);
    REFERRING_PHYSICIAN_NAME, "ReferringPhysicianName", 0x0008, 0x0090, VirtualVr::Exact(VR::PN);
    INSTITUTION_NAME, "InstitutionName", 0x0008, 0x0080, VirtualVr::Exact(VR::LO);
    OPERATORS_NAME, "OperatorsName", 0x0008, 0x1070, VirtualVr::Exact(VR::PN);
    STUDY_DESCRIPTION, "StudyDescription", 0x0008, 0x1030, VirtualVr::Exact(VR::LO);
    SERIES_DESCRIPTION, "SeriesDescription", 0x0008, 0x103E, VirtualVr::Exact(VR::LO);
    REFERENCED_SOP_CLASS_UID, "ReferencedSOPClassUID", 0x0008, 0x1150, VirtualVr::Exact(VR::UI);
    REFERENCED_SOP_INSTANCE_UID, "ReferencedSOPInstanceUID", 0x0008, 0x1155, VirtualVr::Exact(VR::UI);
    FAILED_SOP_SEQUENCE, "FailedSOPSequence", 0x0008, 0x1198, VirtualVr::Exact(VR::SQ);
    REFERENCED_SOP_SEQUENCE, "ReferencedSOPSequence", 0x0008, 0x1199, VirtualVr::Exact(VR::SQ);
    RETRIEVE_URL, "RetrieveURL", 0x0008, 0x1190, VirtualVr::Exact(VR::UT);
    ANATOMIC_REGION_SEQUENCE, "AnatomicRegionSequence", 0x0008, 0x2218, VirtualVr::Exact(VR::SQ);
    ANATOMIC_REGION_MODIFIER_SEQUENCE, "AnatomicRegionModifierSequence", 0x0008, 0x2220, VirtualVr::Exact(VR::SQ);

    // Patient group (0010,eeee)
    PATIENT_NAME, "PatientName", 0x0010, 0x0010, VirtualVr::Exact(VR::PN);
    PATIENT_ID, "PatientID", 0x0010, 0x0020, VirtualVr::Exact(VR::LO);
    ISSUER_OF_PATIENT_ID, "IssuerOfPatientID", 0x0010, 0x0021, VirtualVr::Exact(VR::LO);
    PATIENT_BIRTH_DATE, "PatientBirthDate", 0x0010, 0x0030, VirtualVr::Exact(VR::DA);
    PATIENT_SEX, "PatientSex", 0x0010, 0x0040, VirtualVr::Exact(VR::CS);
    PATIENT_AGE, "PatientAge", 0x0010, 0x1010, VirtualVr::Exact(VR::AS);
    PATIENT_WEIGHT, "PatientWeight", 0x0010, 0x1030, VirtualVr::Exact(VR::DS);
    PATIENT_ADDRESS, "PatientAddress", 0x0010, 0x1040, VirtualVr::Exact(VR::LO);

    // Acquisition group (0018,eeee)
    DATA_COLLECTION_DIAMETER, "DataCollectionDiameter", 0x0018, 0x0090, VirtualVr::Exact(VR::DS);
    SEQUENCE_OF_ULTRASOUND_REGIONS, "SequenceOfUltrasoundRegions", 0x0018, 0x6011, VirtualVr::Exact(VR::SQ);
    REGION_SPATIAL_FORMAT, "RegionSpatialFormat", 0x0018, 0x6012, VirtualVr::Exact(VR::US);
    GANTRY_DETECTOR_TILT, "GantryDetectorTilt", 0x0018, 0x1120, VirtualVr::Exact(VR::DS);
    TABLE_HEIGHT, "TableHeight", 0x0018, 0x1130, VirtualVr::Exact(VR::DS);
    ROTATION_DIRECTION, "RotationDirection", 0x0018, 0x1140, VirtualVr::Exact(VR::CS);
    CT_ACQUISITION_TYPE_SEQUENCE, "CTAcquisitionTypeSequence", 0x0018, 0x9301, VirtualVr::Exact(VR::SQ);
    ACQUISITION_TYPE, "CTAcquisitionType", 0x0018, 0x9302, VirtualVr::Exact(VR::CS);
    CT_ACQUISITION_DETAILS_SEQUENCE, "CTAcquisitionDetailsSequence", 0x0018, 0x9304, VirtualVr::Exact(VR::SQ);
    FLUOROSCOPY_FLAG, "FluoroscopyFlag", 0x0018, 0x9305, VirtualVr::Exact(VR::CS);
    CONSTANT_VOLUME_FLAG, "ConstantVolumeFlag", 0x0018, 0x9308, VirtualVr::Exact(VR::CS);
    REFERENCED_DEFINED_PROTOCOL_SEQUENCE, "ReferencedDefinedProtocolSequence", 0x0018, 0x9458, VirtualVr::Exact(VR::SQ);

    // Relationship group (0020,eeee)
    STUDY_INSTANCE_UID, "StudyInstanceUID", 0x0020, 0x000D, VirtualVr::Exact(VR::UI);
    SERIES_INSTANCE_UID, "SeriesInstanceUID", 0x0020, 0x000E, VirtualVr::Exact(VR::UI);
    STUDY_ID, "StudyID", 0x0020, 0x0010, VirtualVr::Exact(VR::SH);
    SERIES_NUMBER, "SeriesNumber", 0x0020, 0x0011, VirtualVr::Exact(VR::IS);
    INSTANCE_NUMBER, "InstanceNumber", 0x0020, 0x0013, VirtualVr::Exact(VR::IS);
    NUMBER_OF_STUDY_RELATED_SERIES, "NumberOfStudyRelatedSeries", 0x0020, 0x1206, VirtualVr::Exact(VR::IS);
    NUMBER_OF_STUDY_RELATED_INSTANCES, "NumberOfStudyRelatedInstances", 0x0020, 0x1208, VirtualVr::Exact(VR::IS);
    NUMBER_OF_SERIES_RELATED_INSTANCES, "NumberOfSeriesRelatedInstances", 0x0020, 0x1209, VirtualVr::Exact(VR::IS);

    // Image pixel group (0028,eeee)
    SAMPLES_PER_PIXEL, "SamplesPerPixel", 0x0028, 0x0002, VirtualVr::Exact(VR::US);
    PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", 0x0028, 0x0004, VirtualVr::Exact(VR::CS);
    PLANAR_CONFIGURATION, "PlanarConfiguration", 0x0028, 0x0006, VirtualVr::Exact(VR::US);
    NUMBER_OF_FRAMES, "NumberOfFrames", 0x0028, 0x0008, VirtualVr::Exact(VR::IS);
    ROWS, "Rows", 0x0028, 0x0010, VirtualVr::Exact(VR::US);
    COLUMNS, "Columns", 0x0028, 0x0011, VirtualVr::Exact(VR::US);
    PIXEL_ASPECT_RATIO, "PixelAspectRatio", 0x0028, 0x0034, VirtualVr::Exact(VR::IS);
    BITS_ALLOCATED, "BitsAllocated", 0x0028, 0x0100, VirtualVr::Exact(VR::US);
    BITS_STORED, "BitsStored", 0x0028, 0x0101, VirtualVr::Exact(VR::US);
    HIGH_BIT, "HighBit", 0x0028, 0x0102, VirtualVr::Exact(VR::US);
    PIXEL_REPRESENTATION, "PixelRepresentation", 0x0028, 0x0103, VirtualVr::Exact(VR::US);
    SMALLEST_IMAGE_PIXEL_VALUE, "SmallestImagePixelValue", 0x0028, 0x0106, VirtualVr::Xs;
    LARGEST_IMAGE_PIXEL_VALUE, "LargestImagePixelValue", 0x0028, 0x0107, VirtualVr::Xs;
    PIXEL_PADDING_RANGE_LIMIT, "PixelPaddingRangeLimit", 0x0028, 0x0121, VirtualVr::Xs;
    BURNED_IN_ANNOTATION, "BurnedInAnnotation", 0x0028, 0x0301, VirtualVr::Exact(VR::CS);
    ICC_PROFILE, "ICCProfile", 0x0028, 0x2000, VirtualVr::Exact(VR::OB);
    COLOR_SPACE, "ColorSpace", 0x0028, 0x2002, VirtualVr::Exact(VR::CS);
    LOSSY_IMAGE_COMPRESSION, "LossyImageCompression", 0x0028, 0x2110, VirtualVr::Exact(VR::CS);
    LOSSY_IMAGE_COMPRESSION_RATIO, "LossyImageCompressionRatio", 0x0028, 0x2112, VirtualVr::Exact(VR::DS);
    LOSSY_IMAGE_COMPRESSION_METHOD, "LossyImageCompressionMethod", 0x0028, 0x2114, VirtualVr::Exact(VR::CS);
    RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, "RedPaletteColorLookupTableDescriptor", 0x0028, 0x1101, VirtualVr::Xs;
    GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, "GreenPaletteColorLookupTableDescriptor", 0x0028, 0x1102, VirtualVr::Xs;
    BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR, "BluePaletteColorLookupTableDescriptor", 0x0028, 0x1103, VirtualVr::Xs;
    RED_PALETTE_COLOR_LOOKUP_TABLE_DATA, "RedPaletteColorLookupTableData", 0x0028, 0x1201, VirtualVr::Lt;
    GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA, "GreenPaletteColorLookupTableData", 0x0028, 0x1202, VirtualVr::Lt;
    BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA, "BluePaletteColorLookupTableData", 0x0028, 0x1203, VirtualVr::Lt;
    RESCALE_INTERCEPT, "RescaleIntercept", 0x0028, 0x1052, VirtualVr::Exact(VR::DS);
    RESCALE_SLOPE, "RescaleSlope", 0x0028, 0x1053, VirtualVr::Exact(VR::DS);
    VOILUT_FUNCTION, "VOILUTFunction", 0x0028, 0x1056, VirtualVr::Exact(VR::CS);
    PIXEL_DATA_PROVIDER_URL, "PixelDataProviderURL", 0x0028, 0x7FE0, VirtualVr::Exact(VR::UT);

    // Study group (0032,eeee)
    REQUESTING_PHYSICIAN, "RequestingPhysician", 0x0032, 0x1032, VirtualVr::Exact(VR::PN);
    REQUESTED_PROCEDURE_DESCRIPTION, "RequestedProcedureDescription", 0x0032, 0x1060, VirtualVr::Exact(VR::LO);
    REQUESTED_PROCEDURE_CODE_SEQUENCE, "RequestedProcedureCodeSequence", 0x0032, 0x1064, VirtualVr::Exact(VR::SQ);

    // Procedure step / scheduling group (0040,eeee)
    SCHEDULED_STATION_AE_TITLE, "ScheduledStationAETitle", 0x0040, 0x0001, VirtualVr::Exact(VR::AE);
    SCHEDULED_PROCEDURE_STEP_START_DATE, "ScheduledProcedureStepStartDate", 0x0040, 0x0002, VirtualVr::Exact(VR::DA);
    SCHEDULED_PROCEDURE_STEP_START_TIME, "ScheduledProcedureStepStartTime", 0x0040, 0x0003, VirtualVr::Exact(VR::TM);
    SCHEDULED_PERFORMING_PHYSICIAN_NAME, "ScheduledPerformingPhysicianName", 0x0040, 0x0006, VirtualVr::Exact(VR::PN);
    SCHEDULED_PROCEDURE_STEP_DESCRIPTION, "ScheduledProcedureStepDescription", 0x0040, 0x0007, VirtualVr::Exact(VR::LO);
    SCHEDULED_STATION_NAME, "ScheduledStationName", 0x0040, 0x0010, VirtualVr::Exact(VR::SH);
    SCHEDULED_PROCEDURE_STEP_LOCATION, "ScheduledProcedureStepLocation", 0x0040, 0x0011, VirtualVr::Exact(VR::SH);
    SCHEDULED_PROCEDURE_STEP_SEQUENCE, "ScheduledProcedureStepSequence", 0x0040, 0x0100, VirtualVr::Exact(VR::SQ);
    REQUESTED_PROCEDURE_ID, "RequestedProcedureID", 0x0040, 0x1001, VirtualVr::Exact(VR::SH);
    PERFORMED_PROCEDURE_STEP_START_DATE, "PerformedProcedureStepStartDate", 0x0040, 0x0244, VirtualVr::Exact(VR::DA);
    PERFORMED_PROCEDURE_STEP_START_TIME, "PerformedProcedureStepStartTime", 0x0040, 0x0245, VirtualVr::Exact(VR::TM);
    REQUEST_ATTRIBUTES_SEQUENCE, "RequestAttributesSequence", 0x0040, 0x0275, VirtualVr::Exact(VR::SQ);
    CONCEPT_NAME_CODE_SEQUENCE, "ConceptNameCodeSequence", 0x0040, 0xA043, VirtualVr::Exact(VR::SQ);
    CONCEPT_CODE_SEQUENCE, "ConceptCodeSequence", 0x0040, 0xA168, VirtualVr::Exact(VR::SQ);
    CONTENT_SEQUENCE, "ContentSequence", 0x0040, 0xA730, VirtualVr::Exact(VR::SQ);

    // Presentation state group (2050,eeee)
    PRESENTATION_LUT_SHAPE, "PresentationLUTShape", 0x2050, 0x0020, VirtualVr::Exact(VR::CS);

    // Functional groups (5200,eeee)
    SHARED_FUNCTIONAL_GROUPS_SEQUENCE, "SharedFunctionalGroupsSequence", 0x5200, 0x9229, VirtualVr::Exact(VR::SQ);

    // Pixel data group (7FE0,eeee)
    ENCAPSULATED_PIXEL_DATA_VALUE_TOTAL_LENGTH, "EncapsulatedPixelDataValueTotalLength", 0x7FE0, 0x0003, VirtualVr::Exact(VR::OV);
    EXTENDED_OFFSET_TABLE, "ExtendedOffsetTable", 0x7FE0, 0x0001, VirtualVr::Exact(VR::OV);
    EXTENDED_OFFSET_TABLE_LENGTHS, "ExtendedOffsetTableLengths", 0x7FE0, 0x0002, VirtualVr::Exact(VR::OV);
    PIXEL_DATA, "PixelData", 0x7FE0, 0x0010, VirtualVr::Px;
}

/// Overlay Data (60xx,3000), a repeating-group attribute: the group's
/// second-to-last hex digit pair is open, per [`TagRange::Group100`].
pub static OVERLAY_DATA_ENTRY: DataDictionaryEntryRef<'static> = DataDictionaryEntryRef {
    tag: TagRange::Group100(Tag(0x6000, 0x3000)),
    alias: "OverlayData",
    vr: VirtualVr::Ox,
};
