//! Source repository URLs for the orchestrated components

/// Eigen linear algebra library
pub const EIGEN_REPO: &str = "https://gitlab.com/libeigen/eigen.git";

/// VTK visualization toolkit
pub const VTK_REPO: &str = "https://gitlab.kitware.com/vtk/vtk.git";

/// ITK image segmentation and registration toolkit
pub const ITK_REPO: &str = "https://github.com/InsightSoftwareConsortium/ITK.git";

/// OpenCV computer vision library
pub const OPENCV_REPO: &str = "https://github.com/opencv/opencv.git";

/// OpenIGTLink image-guided therapy network protocol
pub const OPENIGTLINK_REPO: &str = "https://github.com/openigtlink/OpenIGTLink.git";

/// The Common Toolkit (widgets and DICOM support)
pub const CTK_REPO: &str = "https://github.com/commontk/CTK.git";

/// FAST medical image computing framework
pub const FAST_REPO: &str = "https://github.com/smistad/FAST.git";

/// Ultrasound reconstruction plugin for navapp
pub const PLUGIN_US_RECONSTRUCTION_REPO: &str =
    "https://github.com/navapp-platform/plugin-us-reconstruction.git";

/// Image-to-patient registration plugin for navapp
pub const PLUGIN_REGISTRATION_REPO: &str =
    "https://github.com/navapp-platform/plugin-registration.git";
