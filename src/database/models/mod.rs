pub mod board;
pub mod certificate;
pub mod commission;
pub mod institution;
pub mod officer;
pub mod place;
pub mod role;
pub mod user;
pub mod validation;

pub use board::{Board, BoardDetail, BoardInput, BoardSearch, BoardStatus, BoardStatusChange, BoardType};
pub use certificate::{
    Certificate, CertificateKind, CertificateSnapshot, CertificateStatus, CertificateVerification,
    IssueCertificate, RevokeCertificate, SnapshotOfficer, VerifiedBoard,
};
pub use commission::{Commission, CommissionInput};
pub use institution::{Institution, InstitutionInput};
pub use officer::{Officer, OfficerInput, OfficerPosition};
pub use place::{Place, PlaceInput, PlaceKind, PlacePath};
pub use role::RoleRecord;
pub use user::{ChangePassword, NewUser, UpdateUser, User, UserCredentials};
pub use validation::ValidationErrors;
